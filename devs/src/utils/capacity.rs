use std::num::NonZero;

/// Queue depth of an output subscription.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Capacity {
    #[default]
    Unbounded,
    Bounded(NonZero<usize>),
}

impl<T> From<T> for Capacity
where
    T: Into<usize>,
{
    fn from(value: T) -> Self {
        let value: usize = value.into();
        match NonZero::new(value) {
            Some(n) => Capacity::Bounded(n),
            None => Capacity::Unbounded,
        }
    }
}

impl Capacity {
    pub fn channel<T>(&self) -> (flume::Sender<T>, flume::Receiver<T>) {
        match self {
            Capacity::Unbounded => flume::unbounded(),
            Capacity::Bounded(n) => flume::bounded(n.get()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_usize() {
        assert_eq!(Capacity::from(0usize), Capacity::Unbounded);
        assert_eq!(
            Capacity::from(4usize),
            Capacity::Bounded(NonZero::new(4).unwrap())
        );
    }

    #[test]
    fn test_bounded_channel() {
        let (tx, rx) = Capacity::from(1usize).channel::<u8>();
        assert!(tx.try_send(1).is_ok());
        assert!(tx.try_send(2).is_err());
        assert_eq!(rx.try_recv(), Ok(1));
    }
}
