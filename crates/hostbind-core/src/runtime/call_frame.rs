use super::{RawReceiver, Value};

/// Arguments and raw receiver of one host call.
///
/// The supplied count is the length of the argument slice.
#[derive(Debug, Clone)]
pub struct CallFrame<'a> {
    receiver: Option<RawReceiver>,
    args: &'a [Value],
}

impl<'a> CallFrame<'a> {
    /// A call without a receiver.
    pub fn new(args: &'a [Value]) -> Self {
        Self {
            receiver: None,
            args,
        }
    }

    /// A call on an instance.
    pub fn with_receiver(receiver: RawReceiver, args: &'a [Value]) -> Self {
        Self {
            receiver: Some(receiver),
            args,
        }
    }

    /// Number of arguments the host supplied.
    pub fn supplied(&self) -> usize {
        self.args.len()
    }

    pub fn arg(&self, index: usize) -> Option<&'a Value> {
        self.args.get(index)
    }

    pub fn args(&self) -> &'a [Value] {
        self.args
    }

    pub fn receiver(&self) -> Option<&RawReceiver> {
        self.receiver.as_ref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::runtime::ObjectHeap;

    #[test]
    fn frame_accessors() {
        let args = [Value::Int(1), Value::from_string("x")];
        let frame = CallFrame::new(&args);
        assert_eq!(frame.supplied(), 2);
        assert_eq!(frame.arg(1), Some(&Value::from_string("x")));
        assert_eq!(frame.arg(2), None);
        assert!(frame.receiver().is_none());
    }

    #[test]
    fn frame_with_receiver() {
        let mut heap = ObjectHeap::new();
        let handle = heap.allocate(());
        let frame = CallFrame::with_receiver(RawReceiver::Bare(handle), &[]);
        assert_eq!(frame.receiver(), Some(&RawReceiver::Bare(handle)));
        assert_eq!(frame.supplied(), 0);
    }
}
