use perforator_core::input::{
    InputEvent, InputProvider,
    keypad::{KeypadConfig, KeypadDecoder},
};

/// Resistor-ladder keypad on one ADC channel.
///
/// `sample` returns the latest raw conversion, or `None` while the converter
/// has nothing new.
pub struct AnalogKeypad<S> {
    sample: S,
    decoder: KeypadDecoder,
}

impl<S> AnalogKeypad<S>
where
    S: FnMut() -> Option<u16>,
{
    pub fn new(sample: S, config: KeypadConfig) -> Self {
        Self {
            sample,
            decoder: KeypadDecoder::new(config),
        }
    }
}

impl<S> InputProvider for AnalogKeypad<S>
where
    S: FnMut() -> Option<u16>,
{
    type Error = core::convert::Infallible;

    fn poll_event(&mut self) -> Result<Option<InputEvent>, Self::Error> {
        if let Some(event) = self.decoder.take_pending() {
            return Ok(Some(event));
        }

        let Some(raw) = (self.sample)() else {
            return Ok(None);
        };

        Ok(self.decoder.feed(raw))
    }
}
