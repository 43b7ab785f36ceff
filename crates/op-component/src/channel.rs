//! A directed fan-out link from one producer output port to a set of
//! consumer (component, input-port) targets.

use op_core::ComponentId;

use crate::signal::Signal;

/// Channels never buffer across ticks: `publish` simply overwrites the
/// current value, and a write after some consumers have already pulled it
/// this tick does not retroactively change what they read — there is no
/// queue to catch up on.
#[derive(Clone, Debug)]
pub struct Channel {
    pub producer: ComponentId,
    pub producer_port: u8,
    pub targets: Vec<(ComponentId, u8)>,
    current: Option<Signal>,
}

impl Channel {
    pub fn new(producer: ComponentId, producer_port: u8) -> Self {
        Self {
            producer,
            producer_port,
            targets: Vec::new(),
            current: None,
        }
    }

    pub fn add_target(&mut self, component: ComponentId, input_port: u8) {
        self.targets.push((component, input_port));
    }

    pub fn publish(&mut self, signal: Signal) {
        self.current = Some(signal);
    }

    pub fn current(&self) -> Option<&Signal> {
        self.current.as_ref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use op_core::ComponentId;

    #[test]
    fn publish_overwrites_current() {
        let mut channel = Channel::new(ComponentId(0), 0);
        channel.add_target(ComponentId(1), 0);
        channel.publish(Signal::Scalar(1.0));
        channel.publish(Signal::Scalar(2.0));
        assert_eq!(channel.current().and_then(Signal::as_scalar), Some(2.0));
    }
}
