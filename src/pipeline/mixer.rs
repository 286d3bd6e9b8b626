use crate::generator::SignalGenerator;

/// Sums several borrowed sources into one block.
///
/// Unlike [`Instrument`](crate::pipeline::Instrument), the running sum is
/// clamped to `[-1, 1]` after every source is added.
pub struct Mixer<'a> {
    sources: Vec<&'a mut dyn SignalGenerator>,
    scratch: Vec<f32>,
}

impl<'a> Mixer<'a> {
    pub fn new() -> Self {
        Self {
            sources: Vec::new(),
            scratch: Vec::new(),
        }
    }

    pub fn with_sources(sources: Vec<&'a mut dyn SignalGenerator>) -> Self {
        Self {
            sources,
            scratch: Vec::new(),
        }
    }

    pub fn add(&mut self, source: &'a mut dyn SignalGenerator) {
        self.sources.push(source);
    }

    pub fn len(&self) -> usize {
        self.sources.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sources.is_empty()
    }
}

impl Default for Mixer<'_> {
    fn default() -> Self {
        Self::new()
    }
}

impl SignalGenerator for Mixer<'_> {
    fn render(&mut self, buffer: &mut [f32]) {
        buffer.fill(0.0);
        self.scratch.resize(buffer.len(), 0.0);

        for source in self.sources.iter_mut() {
            source.render(&mut self.scratch);
            for (out, sample) in buffer.iter_mut().zip(self.scratch.iter()) {
                *out = (*out + sample).clamp(-1.0, 1.0);
            }
        }
    }
}
