//! The `Component` trait and the per-agent registry that stores instances
//! of it.

use std::any::Any;
use std::collections::HashMap;

use op_core::{ComponentId, Tick};

use crate::error::ComponentResult;
use crate::signal::Signal;

/// The five kinds of component the reference model distinguishes, used by
/// the scheduler to decide init-vs-recurring task placement and by the
/// component registry's factory lookup.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ComponentKind {
    Sensor,
    Algorithm,
    Dynamics,
    Init,
    Driver,
}

/// Identity and scheduling parameters of a component instance, set once at
/// construction and never mutated afterward.
#[derive(Clone, Debug)]
pub struct ComponentMeta {
    pub id: ComponentId,
    pub kind: ComponentKind,
    pub priority: i32,
    pub cycle_time_ms: i64,
    pub offset_ms: i64,
    pub response_time_ms: i64,
    /// Init components run once at bootstrap rather than recurring every
    /// `cycle_time_ms`.
    pub init: bool,
}

/// A polymorphic unit in an agent's component graph.
///
/// `as_any`/`as_any_mut` mirror the teacher's type-erased component-vector
/// downcast: callers that need a concrete component's internal state (the
/// output writer reading a dynamics component's last computed force, say)
/// can downcast through [`ComponentMap::downcast_ref`] rather than the
/// trait growing an accessor for every implementor.
pub trait Component: Send {
    fn meta(&self) -> &ComponentMeta;

    /// Latch `signal` into input port `port_id`. Implementors must leave
    /// their state untouched on `Err` rather than partially applying it.
    fn update_input(&mut self, port_id: u8, signal: &Signal, t: Tick) -> ComponentResult<()>;

    /// Produce a freshly owned signal for output port `port_id`.
    fn update_output(&mut self, port_id: u8, t: Tick) -> ComponentResult<Signal>;

    /// Run the component's step using previously latched inputs. Outputs
    /// are not produced here; they are pulled on demand by `update_output`.
    fn trigger(&mut self, t: Tick) -> ComponentResult<()>;

    fn as_any(&self) -> &dyn Any;
    fn as_any_mut(&mut self) -> &mut dyn Any;
}

/// Per-agent registry of component instances, keyed by `ComponentId`.
///
/// Unlike the teacher's dense, `AgentId`-indexed `ComponentMap` (one
/// `Vec<T>` per component type shared by every agent), each agent here
/// owns its own small, heterogeneous map of boxed components — the
/// openPASS component graph is a handful of instances per agent rather
/// than one dense column per type across the whole population.
#[derive(Default)]
pub struct ComponentMap {
    components: HashMap<ComponentId, Box<dyn Component>>,
}

impl ComponentMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, component: Box<dyn Component>) {
        self.components.insert(component.meta().id, component);
    }

    pub fn get(&self, id: ComponentId) -> Option<&dyn Component> {
        self.components.get(&id).map(|c| c.as_ref())
    }

    pub fn get_mut(&mut self, id: ComponentId) -> Option<&mut Box<dyn Component>> {
        self.components.get_mut(&id)
    }

    pub fn downcast_ref<T: 'static>(&self, id: ComponentId) -> Option<&T> {
        self.get(id)?.as_any().downcast_ref::<T>()
    }

    pub fn downcast_mut<T: 'static>(&mut self, id: ComponentId) -> Option<&mut T> {
        self.get_mut(id)?.as_any_mut().downcast_mut::<T>()
    }

    pub fn ids(&self) -> impl Iterator<Item = ComponentId> + '_ {
        self.components.keys().copied()
    }

    pub fn len(&self) -> usize {
        self.components.len()
    }

    pub fn is_empty(&self) -> bool {
        self.components.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Echo {
        meta: ComponentMeta,
        last_input: Option<f64>,
    }

    impl Component for Echo {
        fn meta(&self) -> &ComponentMeta {
            &self.meta
        }

        fn update_input(&mut self, port_id: u8, signal: &Signal, _t: Tick) -> ComponentResult<()> {
            if port_id != 0 {
                return Err(crate::error::ComponentError::InvalidLink(self.meta.id, port_id));
            }
            self.last_input = signal.as_scalar();
            Ok(())
        }

        fn update_output(&mut self, _port_id: u8, _t: Tick) -> ComponentResult<Signal> {
            Ok(Signal::Scalar(self.last_input.unwrap_or(0.0)))
        }

        fn trigger(&mut self, _t: Tick) -> ComponentResult<()> {
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
    fn map_roundtrips_and_downcasts() {
        let id = ComponentId(0);
        let mut map = ComponentMap::new();
        map.insert(Box::new(Echo {
            meta: ComponentMeta {
                id,
                kind: ComponentKind::Algorithm,
                priority: 0,
                cycle_time_ms: 100,
                offset_ms: 0,
                response_time_ms: 0,
                init: false,
            },
            last_input: None,
        }));

        map.get_mut(id)
            .unwrap()
            .update_input(0, &Signal::Scalar(4.2), Tick::ZERO)
            .unwrap();

        let echo: &Echo = map.downcast_ref(id).unwrap();
        assert_eq!(echo.last_input, Some(4.2));
    }
}
