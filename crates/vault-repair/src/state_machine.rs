use vault_core::errors::{RepairError, VaultResult};
use vault_core::models::TaskState;

/// Lifecycle of one task execution. Every transition is checked.
#[derive(Debug, Clone)]
pub struct TaskRun {
    task_id: String,
    state: TaskState,
    trail: Vec<TaskState>,
}

impl TaskRun {
    pub fn new(task_id: impl Into<String>) -> Self {
        Self {
            task_id: task_id.into(),
            state: TaskState::Pending,
            trail: vec![TaskState::Pending],
        }
    }

    pub fn task_id(&self) -> &str {
        &self.task_id
    }

    pub fn state(&self) -> TaskState {
        self.state
    }

    /// States visited so far, starting with `Pending`.
    pub fn trail(&self) -> &[TaskState] {
        &self.trail
    }

    pub fn transition(&mut self, next: TaskState) -> VaultResult<()> {
        if !self.state.can_transition_to(next) {
            return Err(RepairError::InvalidTransition {
                from: self.state.to_string(),
                to: next.to_string(),
            }
            .into());
        }
        tracing::trace!(task_id = %self.task_id, from = %self.state, to = %next, "task transition");
        self.state = next;
        self.trail.push(next);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn happy_path_reaches_terminal_state() {
        let mut run = TaskRun::new("t1");
        run.transition(TaskState::Running).unwrap();
        run.transition(TaskState::Done).unwrap();
        assert_eq!(
            run.trail(),
            &[TaskState::Pending, TaskState::Running, TaskState::Done]
        );
        assert!(run.state().is_terminal());
    }

    #[test]
    fn invalid_transitions_are_rejected() {
        let mut run = TaskRun::new("t1");
        assert!(run.transition(TaskState::Done).is_err());
        run.transition(TaskState::Running).unwrap();
        run.transition(TaskState::Failed).unwrap();
        assert!(run.transition(TaskState::Running).is_err());
        assert!(run.transition(TaskState::Done).is_err());
        assert_eq!(run.state(), TaskState::Failed);
    }
}
