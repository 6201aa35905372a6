// TaskResultUtil.
// The job outcome type and its translation to a process exit code.

use serde::{Deserialize, Serialize};

/// Offset added to TaskResult values to produce process return codes.
const RETURN_CODE_OFFSET: i32 = 100;

/// Terminal result of a job or step, mirroring the distributed task `TaskResult`.
///
/// Ordered from best to worst; `merge_task_results` relies on that order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[repr(i32)]
pub enum TaskResult {
    Succeeded = 0,
    SucceededWithIssues = 1,
    Failed = 2,
    Canceled = 3,
    Skipped = 4,
    Abandoned = 5,
}

impl TaskResult {
    /// Create a `TaskResult` from its integer representation.
    pub fn from_i32(value: i32) -> Option<Self> {
        match value {
            0 => Some(TaskResult::Succeeded),
            1 => Some(TaskResult::SucceededWithIssues),
            2 => Some(TaskResult::Failed),
            3 => Some(TaskResult::Canceled),
            4 => Some(TaskResult::Skipped),
            5 => Some(TaskResult::Abandoned),
            _ => None,
        }
    }
}

impl std::fmt::Display for TaskResult {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            TaskResult::Succeeded => "Succeeded",
            TaskResult::SucceededWithIssues => "SucceededWithIssues",
            TaskResult::Failed => "Failed",
            TaskResult::Canceled => "Canceled",
            TaskResult::Skipped => "Skipped",
            TaskResult::Abandoned => "Abandoned",
        };
        f.write_str(name)
    }
}

/// Task result utilities.
pub struct TaskResultUtil;

impl TaskResultUtil {
    /// Check whether a return code can be translated back to a `TaskResult`.
    pub fn is_valid_return_code(return_code: i32) -> bool {
        TaskResult::from_i32(return_code - RETURN_CODE_OFFSET).is_some()
    }

    /// Translate a `TaskResult` to a process return code.
    pub fn translate_to_return_code(result: TaskResult) -> i32 {
        RETURN_CODE_OFFSET + (result as i32)
    }

    /// Translate a process return code to a `TaskResult`; unknown codes are `Failed`.
    pub fn translate_from_return_code(return_code: i32) -> TaskResult {
        TaskResult::from_i32(return_code - RETURN_CODE_OFFSET).unwrap_or(TaskResult::Failed)
    }

    /// Merge two results, keeping the worse one.
    ///
    /// Once the current result is worse than `Failed` (Canceled, Skipped,
    /// Abandoned) it is kept regardless of what comes next.
    pub fn merge_task_results(current_result: Option<TaskResult>, coming_result: TaskResult) -> TaskResult {
        match current_result {
            None => coming_result,
            Some(current) if current > TaskResult::Failed => current,
            Some(current) => current.max(coming_result),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_translate_to_return_code() {
        assert_eq!(TaskResultUtil::translate_to_return_code(TaskResult::Succeeded), 100);
        assert_eq!(TaskResultUtil::translate_to_return_code(TaskResult::Failed), 102);
        assert_eq!(TaskResultUtil::translate_to_return_code(TaskResult::Canceled), 103);
        assert_eq!(TaskResultUtil::translate_to_return_code(TaskResult::Abandoned), 105);
    }

    #[test]
    fn test_translate_from_return_code() {
        assert_eq!(TaskResultUtil::translate_from_return_code(101), TaskResult::SucceededWithIssues);
        assert_eq!(TaskResultUtil::translate_from_return_code(103), TaskResult::Canceled);
        assert_eq!(TaskResultUtil::translate_from_return_code(1), TaskResult::Failed);
    }

    #[test]
    fn test_is_valid_return_code() {
        assert!(TaskResultUtil::is_valid_return_code(100));
        assert!(TaskResultUtil::is_valid_return_code(105));
        assert!(!TaskResultUtil::is_valid_return_code(99));
        assert!(!TaskResultUtil::is_valid_return_code(106));
    }

    #[test]
    fn test_merge_keeps_worse_result() {
        assert_eq!(
            TaskResultUtil::merge_task_results(None, TaskResult::SucceededWithIssues),
            TaskResult::SucceededWithIssues
        );
        assert_eq!(
            TaskResultUtil::merge_task_results(Some(TaskResult::Succeeded), TaskResult::Failed),
            TaskResult::Failed
        );
        assert_eq!(
            TaskResultUtil::merge_task_results(Some(TaskResult::Failed), TaskResult::Succeeded),
            TaskResult::Failed
        );
    }

    #[test]
    fn test_merge_canceled_is_sticky() {
        assert_eq!(
            TaskResultUtil::merge_task_results(Some(TaskResult::Canceled), TaskResult::Abandoned),
            TaskResult::Canceled
        );
        assert_eq!(
            TaskResultUtil::merge_task_results(Some(TaskResult::Failed), TaskResult::Canceled),
            TaskResult::Canceled
        );
    }

    #[test]
    fn test_display() {
        assert_eq!(TaskResult::SucceededWithIssues.to_string(), "SucceededWithIssues");
    }
}
