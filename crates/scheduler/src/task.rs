use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use distcalc_core::{Operator, TaskPayload};

use crate::error::InvalidId;
use crate::tree::NodeId;

macro_rules! counter_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub u64);

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl FromStr for $name {
            type Err = InvalidId;

            /// Plain ASCII decimal digits only: no sign, no whitespace.
            fn from_str(s: &str) -> Result<Self, Self::Err> {
                if s.is_empty() || !s.bytes().all(|b| b.is_ascii_digit()) {
                    return Err(InvalidId(s.to_string()));
                }
                s.parse().map($name).map_err(|_| InvalidId(s.to_string()))
            }
        }
    };
}

counter_id!(
    /// Expression id, allocated from 1 in submission order.
    ExpressionId
);
counter_id!(
    /// Task id, allocated from 1 in emission order across all expressions.
    TaskId
);

/// One ready operation waiting for (or assigned to) a worker.
#[derive(Debug, Clone, PartialEq)]
pub struct Task {
    pub id: TaskId,
    pub expression_id: ExpressionId,
    pub arg1: f64,
    pub arg2: f64,
    pub operator: Operator,
    /// Duration hint in milliseconds.
    pub operation_time: u64,
    /// Node in the owning expression's tree that this task resolves.
    pub node: NodeId,
}

impl Task {
    pub fn to_payload(&self) -> TaskPayload {
        TaskPayload {
            id: self.id.to_string(),
            arg1: self.arg1,
            arg2: self.arg2,
            operation: self.operator.symbol().to_string(),
            operation_time: self.operation_time,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_parse_and_display_as_decimal() {
        assert_eq!("17".parse::<TaskId>(), Ok(TaskId(17)));
        assert_eq!(ExpressionId(3).to_string(), "3");
        assert!("abc".parse::<TaskId>().is_err());
        assert!("-1".parse::<ExpressionId>().is_err());
    }

    #[test]
    fn ids_reject_signs_and_padding() {
        for text in ["+5", " 5", "5 ", "", "0x5", "٣"] {
            assert_eq!(text.parse::<TaskId>(), Err(InvalidId(text.to_string())));
        }
        assert!("18446744073709551616".parse::<TaskId>().is_err());
        assert_eq!("007".parse::<ExpressionId>(), Ok(ExpressionId(7)));
    }

    #[test]
    fn payload_carries_symbol_and_string_id() {
        let task = Task {
            id: TaskId(4),
            expression_id: ExpressionId(1),
            arg1: 6.0,
            arg2: 2.0,
            operator: Operator::Div,
            operation_time: 300,
            node: NodeId(2),
        };
        let payload = task.to_payload();
        assert_eq!(payload.id, "4");
        assert_eq!(payload.operation, "/");
        assert_eq!(payload.operation_time, 300);
    }
}
