//! Turns an agent's component graph into the task items that drive it every
//! tick: one trigger per component, plus one update per channel endpoint
//! that the component's output touches.

use op_component::{Channel, ComponentMap};
use op_core::AgentId;

use crate::task::TaskItem;

/// The task items an agent contributes to the scheduler, split the way
/// `SchedulerTasks` wants them: components flagged `init` are non-recurring,
/// everything else is recurring.
#[derive(Clone, Debug, Default)]
pub struct ParsedAgentTasks {
    pub recurring: Vec<TaskItem>,
    pub non_recurring: Vec<TaskItem>,
}

/// Walk `components` and `channels` for one agent and build its task items.
///
/// For every component: a trigger item at `(priority, cycle_time, offset)`,
/// and an update item at `(priority, cycle_time, response_time)` standing in
/// for the producer pulling its own output. Then, for every channel whose
/// producer is that component, one more update item per `(target_component,
/// target_port)` — the fan-out that delivers the signal to its consumers.
/// The item itself doesn't carry which port it targets; the executing side
/// re-derives that from the channel graph when the task comes due, and a
/// repeated delivery attempt within the same tick is harmless because
/// publishing a channel is idempotent.
pub fn parse_agent(agent_id: AgentId, components: &ComponentMap, channels: &[Channel]) -> ParsedAgentTasks {
    let mut parsed = ParsedAgentTasks::default();

    for component_id in components.ids() {
        let Some(component) = components.get(component_id) else {
            continue;
        };
        let meta = component.meta();

        // `response_time` shifts the Update task relative to the tick the
        // Trigger fired on, not within it: an Update for a Trigger at
        // `offset + n*cycle` runs at `offset + response_time + n*cycle`.
        let update_delay = meta.offset_ms + meta.response_time_ms;
        let trigger = TaskItem::trigger(agent_id, meta.priority, meta.cycle_time_ms, meta.offset_ms);
        let acquire_output = TaskItem::update(agent_id, meta.priority, meta.cycle_time_ms, update_delay);

        let destination = if meta.init {
            &mut parsed.non_recurring
        } else {
            &mut parsed.recurring
        };
        destination.push(trigger);
        destination.push(acquire_output);

        for channel in channels.iter().filter(|c| c.producer == component_id) {
            for _ in &channel.targets {
                let delivery = TaskItem::update(agent_id, meta.priority, meta.cycle_time_ms, update_delay);
                destination.push(delivery);
            }
        }
    }

    parsed
}

#[cfg(test)]
mod tests {
    use super::*;
    use op_component::{Component, ComponentKind, ComponentMeta};
    use op_core::{ComponentId, Tick};

    struct Noop {
        meta: ComponentMeta,
    }

    impl Component for Noop {
        fn meta(&self) -> &ComponentMeta {
            &self.meta
        }
        fn update_input(
            &mut self,
            _port_id: u8,
            _signal: &op_component::Signal,
            _t: Tick,
        ) -> op_component::ComponentResult<()> {
            Ok(())
        }
        fn update_output(&mut self, _port_id: u8, _t: Tick) -> op_component::ComponentResult<op_component::Signal> {
            Ok(op_component::Signal::Scalar(0.0))
        }
        fn trigger(&mut self, _t: Tick) -> op_component::ComponentResult<()> {
            Ok(())
        }
        fn as_any(&self) -> &dyn std::any::Any {
            self
        }
        fn as_any_mut(&mut self) -> &mut dyn std::any::Any {
            self
        }
    }

    #[test]
    fn init_component_goes_to_non_recurring() {
        let mut components = ComponentMap::new();
        let id = ComponentId(0);
        components.insert(Box::new(Noop {
            meta: ComponentMeta {
                id,
                kind: ComponentKind::Init,
                priority: 0,
                cycle_time_ms: 0,
                offset_ms: 0,
                response_time_ms: 0,
                init: true,
            },
        }));

        let parsed = parse_agent(AgentId(0), &components, &[]);
        assert!(parsed.recurring.is_empty());
        assert_eq!(parsed.non_recurring.len(), 2);
    }

    #[test]
    fn channel_targets_each_emit_an_update_item() {
        let mut components = ComponentMap::new();
        let producer = ComponentId(0);
        let consumer = ComponentId(1);
        components.insert(Box::new(Noop {
            meta: ComponentMeta {
                id: producer,
                kind: ComponentKind::Algorithm,
                priority: 0,
                cycle_time_ms: 100,
                offset_ms: 0,
                response_time_ms: 10,
                init: false,
            },
        }));

        let mut channel = Channel::new(producer, 0);
        channel.add_target(consumer, 0);
        channel.add_target(consumer, 1);

        let parsed = parse_agent(AgentId(0), &components, std::slice::from_ref(&channel));
        // trigger + acquire + one update per target (2) = 4
        assert_eq!(parsed.recurring.len(), 4);
    }
}
