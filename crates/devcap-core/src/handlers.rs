// Devcap Dispatch Handlers
// Per-family device handlers invoked by the subsystem registry

use crate::classify::{classify, set_input_type_markers, Capabilities, DeviceClass};
use crate::device::Device;
use crate::parent::{set_legacy_parent, strip_name, synthesize_parent};
use crate::sysctl::SysctlSource;

/// Sysname reported for evdev devices with no physical location.
const VIRTUAL_SYSNAME: &str = "uinput";

/// Probe an evdev node: query its capability bitmaps, classify, and
/// synthesize a parent from the reported identity.
///
/// Any failure to open or query the node abandons the device
/// silently; the handle is released on every exit path.
pub(crate) fn handle_evdev(device: &mut Device) {
    let handle = match evdev::Device::open(device.devnode()) {
        Ok(handle) => handle,
        Err(err) => {
            log::debug!("{}: could not open evdev node: {}", device.sysname(), err);
            return;
        }
    };

    let caps = Capabilities::from_evdev(&handle);
    let Some(class) = classify(&caps) else {
        log::debug!("{}: no recognizable input capabilities", device.sysname());
        return;
    };
    set_input_type_markers(device, class);
    log::debug!("{}: classified as {}", device.sysname(), class);

    let name = strip_name(handle.name().unwrap_or_default()).to_string();
    let id = handle.input_id();
    let product = format!(
        "{:x}/{:x}/{:x}/{:x}",
        id.bus_type().0,
        id.vendor(),
        id.product(),
        id.version()
    );
    let sysname = match handle.physical_path() {
        Some(phys) if !phys.is_empty() => phys.to_string(),
        _ => VIRTUAL_SYSNAME.to_string(),
    };

    let parent = synthesize_parent(&sysname, &name, Some(&product), None);
    device.set_parent(parent);
}

pub(crate) fn handle_keyboard(device: &mut Device, sysctl: &dyn SysctlSource) {
    set_input_type_markers(device, DeviceClass::Keyboard);
    set_legacy_parent(device, sysctl);
}

pub(crate) fn handle_mouse(device: &mut Device, sysctl: &dyn SysctlSource) {
    set_input_type_markers(device, DeviceClass::Mouse);
    set_legacy_parent(device, sysctl);
}

pub(crate) fn handle_joystick(device: &mut Device, sysctl: &dyn SysctlSource) {
    set_input_type_markers(device, DeviceClass::Joystick);
    set_legacy_parent(device, sysctl);
}

pub(crate) fn handle_touchpad(device: &mut Device, sysctl: &dyn SysctlSource) {
    set_input_type_markers(device, DeviceClass::Touchpad);
    set_legacy_parent(device, sysctl);
}

pub(crate) fn handle_touchscreen(device: &mut Device, sysctl: &dyn SysctlSource) {
    set_input_type_markers(device, DeviceClass::Touchscreen);
    set_legacy_parent(device, sysctl);
}

// The keyboard multiplexer and system mouse have no per-unit sysctl
// metadata; their parents carry a fixed name and identity.

pub(crate) fn handle_kbdmux(device: &mut Device) {
    set_input_type_markers(device, DeviceClass::Keyboard);
    let sysname = device.sysname().to_string();
    let parent = synthesize_parent(&sysname, "System keyboard multiplexor", Some("6/1/1/0"), None);
    device.set_parent(parent);
}

pub(crate) fn handle_sysmouse(device: &mut Device) {
    set_input_type_markers(device, DeviceClass::Mouse);
    let sysname = device.sysname().to_string();
    let parent = synthesize_parent(&sysname, "System mouse", Some("6/2/1/0"), None);
    device.set_parent(parent);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sysctl::StaticSysctl;

    #[test]
    fn test_kbdmux_fixed_parent() {
        let mut device = Device::new("/dev/kbdmux0");
        handle_kbdmux(&mut device);
        assert_eq!(device.properties().get("ID_INPUT_KEYBOARD"), Some("1"));
        let parent = device.parent().unwrap();
        assert_eq!(parent.sysname(), "kbdmux0");
        assert_eq!(
            parent.properties().get("NAME"),
            Some("System keyboard multiplexor")
        );
        assert_eq!(parent.properties().get("PRODUCT"), Some("6/1/1/0"));
    }

    #[test]
    fn test_sysmouse_fixed_parent() {
        let mut device = Device::new("/dev/sysmouse");
        handle_sysmouse(&mut device);
        assert_eq!(device.properties().get("ID_INPUT_MOUSE"), Some("1"));
        let parent = device.parent().unwrap();
        assert_eq!(parent.properties().get("NAME"), Some("System mouse"));
        assert_eq!(parent.properties().get("PRODUCT"), Some("6/2/1/0"));
    }

    #[test]
    fn test_legacy_handler_classifies_even_without_metadata() {
        // Parent synthesis fails (no sysctl entries) but the marker
        // set is still attached.
        let sysctl = StaticSysctl::new();
        let mut device = Device::new("/dev/joy0");
        handle_joystick(&mut device, &sysctl);
        assert_eq!(device.properties().get("ID_INPUT"), Some("1"));
        assert_eq!(device.properties().get("ID_INPUT_JOYSTICK"), Some("1"));
        assert!(device.parent().is_none());
    }
}
