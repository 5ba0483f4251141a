// Devcap Subsystem Registry
// Path-pattern dispatch table routing device nodes to handlers

use std::sync::OnceLock;

use glob::Pattern;

use crate::device::Device;
use crate::gate::EvdevGate;
use crate::handlers;
use crate::sysctl::{KernelSysctl, SysctlSource};

/// Handler selector for a matched rule, dispatched through a single
/// exhaustive match.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HandlerKind {
    Evdev,
    Keyboard,
    Mouse,
    Kbdmux,
    Joystick,
    Touchpad,
    Touchscreen,
    Sysmouse,
}

/// One entry of the dispatch table.
#[derive(Debug, Clone, Copy)]
pub struct SubsystemRule {
    pub subsystem: &'static str,
    /// Shell-style glob matched against the absolute node path.
    pub pattern: &'static str,
    /// Skip the device when the kernel already exposes it through
    /// evdev, so the same hardware is not classified twice.
    pub skip_if_evdev: bool,
    pub handler: HandlerKind,
}

/// Dispatch table. The first matching pattern wins; declaration
/// order is significant.
pub const SUBSYSTEM_RULES: &[SubsystemRule] = &[
    SubsystemRule {
        subsystem: "input",
        pattern: "/dev/input/event[0-9]*",
        skip_if_evdev: false,
        handler: HandlerKind::Evdev,
    },
    SubsystemRule {
        subsystem: "input",
        pattern: "/dev/ukbd[0-9]*",
        skip_if_evdev: true,
        handler: HandlerKind::Keyboard,
    },
    SubsystemRule {
        subsystem: "input",
        pattern: "/dev/atkbd[0-9]*",
        skip_if_evdev: true,
        handler: HandlerKind::Keyboard,
    },
    SubsystemRule {
        subsystem: "input",
        pattern: "/dev/kbdmux[0-9]*",
        skip_if_evdev: true,
        handler: HandlerKind::Kbdmux,
    },
    SubsystemRule {
        subsystem: "input",
        pattern: "/dev/ums[0-9]*",
        skip_if_evdev: true,
        handler: HandlerKind::Mouse,
    },
    SubsystemRule {
        subsystem: "input",
        pattern: "/dev/psm[0-9]*",
        skip_if_evdev: true,
        handler: HandlerKind::Mouse,
    },
    SubsystemRule {
        subsystem: "input",
        pattern: "/dev/joy[0-9]*",
        skip_if_evdev: false,
        handler: HandlerKind::Joystick,
    },
    SubsystemRule {
        subsystem: "input",
        pattern: "/dev/atp[0-9]*",
        skip_if_evdev: false,
        handler: HandlerKind::Touchpad,
    },
    SubsystemRule {
        subsystem: "input",
        pattern: "/dev/wsp[0-9]*",
        skip_if_evdev: false,
        handler: HandlerKind::Touchpad,
    },
    SubsystemRule {
        subsystem: "input",
        pattern: "/dev/uep[0-9]*",
        skip_if_evdev: false,
        handler: HandlerKind::Touchscreen,
    },
    SubsystemRule {
        subsystem: "input",
        pattern: "/dev/sysmouse",
        skip_if_evdev: true,
        handler: HandlerKind::Sysmouse,
    },
    SubsystemRule {
        subsystem: "input",
        pattern: "/dev/vboxguest",
        skip_if_evdev: false,
        handler: HandlerKind::Mouse,
    },
];

fn compiled_rules() -> &'static [(Pattern, &'static SubsystemRule)] {
    static COMPILED: OnceLock<Vec<(Pattern, &'static SubsystemRule)>> = OnceLock::new();
    COMPILED.get_or_init(|| {
        SUBSYSTEM_RULES
            .iter()
            .filter_map(|rule| Pattern::new(rule.pattern).ok().map(|pattern| (pattern, rule)))
            .collect()
    })
}

/// Find the first rule whose pattern matches `path`, or `None` for
/// nodes outside the table.
pub fn rule_for_path(path: &str) -> Option<&'static SubsystemRule> {
    compiled_rules()
        .iter()
        .find(|(pattern, _)| pattern.matches(path))
        .map(|(_, rule)| *rule)
}

/// Classification entry point.
///
/// Owns the sysctl source and the evdev feature gate, constructed
/// once and passed by reference through every dispatch; there is no
/// ambient global state.
pub struct Dispatcher {
    sysctl: Box<dyn SysctlSource>,
    gate: EvdevGate,
}

impl Dispatcher {
    pub fn new(sysctl: Box<dyn SysctlSource>) -> Self {
        Self {
            sysctl,
            gate: EvdevGate::new(),
        }
    }

    /// Dispatcher reading the live kernel sysctl tree.
    pub fn with_kernel() -> Self {
        Self::new(Box::new(KernelSysctl::new()))
    }

    /// Subsystem a device path belongs to, or `None` for nodes the
    /// registry does not handle — including legacy nodes hidden
    /// because the kernel exposes them through evdev.
    pub fn subsystem_for_path(&self, path: &str) -> Option<&'static str> {
        let rule = rule_for_path(path)?;
        if rule.skip_if_evdev && self.gate.is_enabled(self.sysctl.as_ref()) {
            log::trace!("{}: exposed through evdev, skipping", path);
            return None;
        }
        Some(rule.subsystem)
    }

    /// Classify a device and synthesize its parent record.
    ///
    /// Unmatched paths are left untouched; that is not an error.
    pub fn dispatch(&self, device: &mut Device) {
        let Some(rule) = rule_for_path(device.syspath()) else {
            return;
        };
        if rule.skip_if_evdev && self.gate.is_enabled(self.sysctl.as_ref()) {
            log::trace!("{}: exposed through evdev, skipping", device.syspath());
            return;
        }
        match rule.handler {
            HandlerKind::Evdev => handlers::handle_evdev(device),
            HandlerKind::Keyboard => handlers::handle_keyboard(device, self.sysctl.as_ref()),
            HandlerKind::Mouse => handlers::handle_mouse(device, self.sysctl.as_ref()),
            HandlerKind::Kbdmux => handlers::handle_kbdmux(device),
            HandlerKind::Joystick => handlers::handle_joystick(device, self.sysctl.as_ref()),
            HandlerKind::Touchpad => handlers::handle_touchpad(device, self.sysctl.as_ref()),
            HandlerKind::Touchscreen => {
                handlers::handle_touchscreen(device, self.sysctl.as_ref())
            }
            HandlerKind::Sysmouse => handlers::handle_sysmouse(device),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gate::EVDEV_FEATURE;
    use crate::sysctl::StaticSysctl;

    #[test]
    fn test_event_node_matches_evdev_rule() {
        let rule = rule_for_path("/dev/input/event7").unwrap();
        assert_eq!(rule.handler, HandlerKind::Evdev);
        assert_eq!(rule.subsystem, "input");
        assert!(!rule.skip_if_evdev);
    }

    #[test]
    fn test_legacy_nodes_match_their_rules() {
        for (path, handler) in [
            ("/dev/ukbd0", HandlerKind::Keyboard),
            ("/dev/atkbd0", HandlerKind::Keyboard),
            ("/dev/kbdmux0", HandlerKind::Kbdmux),
            ("/dev/ums1", HandlerKind::Mouse),
            ("/dev/psm0", HandlerKind::Mouse),
            ("/dev/joy0", HandlerKind::Joystick),
            ("/dev/atp0", HandlerKind::Touchpad),
            ("/dev/wsp0", HandlerKind::Touchpad),
            ("/dev/uep0", HandlerKind::Touchscreen),
            ("/dev/sysmouse", HandlerKind::Sysmouse),
            ("/dev/vboxguest", HandlerKind::Mouse),
        ] {
            let rule = rule_for_path(path).unwrap();
            assert_eq!(rule.handler, handler, "{}", path);
        }
    }

    #[test]
    fn test_unmatched_paths_resolve_to_none() {
        assert!(rule_for_path("/dev/ttyu0").is_none());
        assert!(rule_for_path("/dev/input/js0").is_none());
        assert!(rule_for_path("/dev/ukbd").is_none());
        assert!(rule_for_path("ukbd0").is_none());
    }

    #[test]
    fn test_first_matching_rule_wins() {
        // Multi-digit units stay with the first declared pattern.
        let rule = rule_for_path("/dev/input/event12").unwrap();
        assert_eq!(rule.handler, HandlerKind::Evdev);
    }

    #[test]
    fn test_subsystem_reported_when_evdev_disabled() {
        let dispatcher =
            Dispatcher::new(Box::new(StaticSysctl::new().with_int(EVDEV_FEATURE, 0)));
        assert_eq!(dispatcher.subsystem_for_path("/dev/ukbd0"), Some("input"));
        assert_eq!(
            dispatcher.subsystem_for_path("/dev/input/event0"),
            Some("input")
        );
        assert_eq!(dispatcher.subsystem_for_path("/dev/ttyu0"), None);
    }

    #[test]
    fn test_subsystem_hidden_when_evdev_enabled() {
        let dispatcher =
            Dispatcher::new(Box::new(StaticSysctl::new().with_int(EVDEV_FEATURE, 1)));
        assert_eq!(dispatcher.subsystem_for_path("/dev/ukbd0"), None);
        // Rules without the skip flag are unaffected.
        assert_eq!(dispatcher.subsystem_for_path("/dev/joy0"), Some("input"));
        assert_eq!(
            dispatcher.subsystem_for_path("/dev/input/event0"),
            Some("input")
        );
    }

    #[test]
    fn test_dispatch_skips_legacy_node_when_evdev_enabled() {
        let dispatcher =
            Dispatcher::new(Box::new(StaticSysctl::new().with_int(EVDEV_FEATURE, 1)));
        let mut device = Device::new("/dev/ukbd0");
        dispatcher.dispatch(&mut device);
        assert!(device.properties().is_empty());
        assert!(device.parent().is_none());
    }

    #[test]
    fn test_dispatch_handles_legacy_node_when_evdev_disabled() {
        let dispatcher =
            Dispatcher::new(Box::new(StaticSysctl::new().with_int(EVDEV_FEATURE, 0)));
        let mut device = Device::new("/dev/ukbd0");
        dispatcher.dispatch(&mut device);
        assert_eq!(device.properties().get("ID_INPUT_KEYBOARD"), Some("1"));
    }

    #[test]
    fn test_dispatch_ignores_unmatched_device() {
        let dispatcher = Dispatcher::new(Box::new(StaticSysctl::new()));
        let mut device = Device::new("/dev/ttyu0");
        dispatcher.dispatch(&mut device);
        assert!(device.properties().is_empty());
        assert!(device.parent().is_none());
    }

    #[test]
    fn test_unreadable_feature_flag_falls_back_to_handling() {
        // No flag in the table: the gate treats the query failure as
        // disabled and the legacy node is still classified.
        let dispatcher = Dispatcher::new(Box::new(StaticSysctl::new()));
        let mut device = Device::new("/dev/psm0");
        dispatcher.dispatch(&mut device);
        assert_eq!(device.properties().get("ID_INPUT_MOUSE"), Some("1"));
    }
}
