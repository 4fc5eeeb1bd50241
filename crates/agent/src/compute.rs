use distcalc_core::{ComputeError, Operator, TaskPayload};

/// `arg1 <operation> arg2` with plain `f64` arithmetic.
pub fn calculate(task: &TaskPayload) -> Result<f64, ComputeError> {
    let op: Operator = task.operation.parse()?;
    op.apply(task.arg1, task.arg2)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn task(arg1: f64, operation: &str, arg2: f64) -> TaskPayload {
        TaskPayload {
            id: "1".to_string(),
            arg1,
            arg2,
            operation: operation.to_string(),
            operation_time: 0,
        }
    }

    #[test]
    fn computes_each_operator() {
        assert_eq!(calculate(&task(2.0, "+", 3.0)), Ok(5.0));
        assert_eq!(calculate(&task(2.0, "-", 3.0)), Ok(-1.0));
        assert_eq!(calculate(&task(2.0, "*", 3.0)), Ok(6.0));
        assert_eq!(calculate(&task(3.0, "/", 2.0)), Ok(1.5));
    }

    #[test]
    fn reports_bad_input() {
        assert_eq!(calculate(&task(1.0, "/", 0.0)), Err(ComputeError::DivisionByZero));
        assert_eq!(
            calculate(&task(1.0, "^", 2.0)),
            Err(ComputeError::InvalidOperator("^".to_string()))
        );
    }
}
