/// The answer a consumer gives after receiving an element.
///
/// A producer must not call the consumer again once it has answered [`Control::Stop`].
#[must_use]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Control {
    /// Deliver the next element, if any.
    Continue,
    /// End the iteration now. Resources held by the producer are released
    /// before `iterate` returns.
    Stop,
}

impl Control {
    #[inline]
    pub fn is_continue(self) -> bool {
        matches!(self, Control::Continue)
    }

    #[inline]
    pub fn is_stop(self) -> bool {
        matches!(self, Control::Stop)
    }
}

impl From<bool> for Control {
    /// `true` means continue, `false` means stop.
    #[inline]
    fn from(proceed: bool) -> Self {
        if proceed {
            Control::Continue
        } else {
            Control::Stop
        }
    }
}
