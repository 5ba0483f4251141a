// Devcap Parent Synthesis
// Synthetic parent metadata records for classified devices

use crate::codes::{BUS_I8042, BUS_PCI, BUS_USB, BUS_VIRTUAL};
use crate::device::Device;
use crate::pnpinfo::{parse_number, PnpInfo};
use crate::sysctl::SysctlSource;

// Fixed identity for PS/2 devices behind the AT keyboard controller,
// which reports no pnpinfo of its own.
pub const PS2_KEYBOARD_VENDOR: u32 = 0x001;
pub const PS2_KEYBOARD_PRODUCT: u32 = 0x001;
pub const PS2_MOUSE_VENDOR: u32 = 0x002;
pub const PS2_MOUSE_GENERIC_PRODUCT: u32 = 0x001;

/// Truncate a device description at the first comma. Kernel
/// descriptions read like `"Vendor, Inc Mouse"`; only the part
/// before the comma is displayed.
pub fn strip_name(name: &str) -> &str {
    match name.split_once(',') {
        Some((head, _)) => head,
        None => name,
    }
}

// Split a sysname into driver base name and trailing unit number.
// `None` when there is no trailing digit, i.e. no unit.
fn split_unit(sysname: &str) -> Option<(&str, &str)> {
    let base_len = sysname
        .trim_end_matches(|c: char| c.is_ascii_digit())
        .len();
    if base_len == sysname.len() {
        return None;
    }
    Some((&sysname[..base_len], &sysname[base_len..]))
}

/// Build a synthetic parent device record.
///
/// Display servers read the device name and identity from the parent
/// node, so the record mirrors the property and attribute shape of a
/// real hardware parent: a NAME/PRODUCT property pair and name/id
/// attributes.
pub fn synthesize_parent(
    sysname: &str,
    name: &str,
    product: Option<&str>,
    pnp_id: Option<&str>,
) -> Device {
    let mut parent = Device::new(sysname);
    parent.properties_mut().insert("NAME", name);
    parent.sysattrs_mut().insert("name", name);
    if let Some(product) = product {
        parent.properties_mut().insert("PRODUCT", product);
    }
    if let Some(pnp_id) = pnp_id {
        parent.sysattrs_mut().insert("id", pnp_id);
    }
    parent
}

/// Derive and attach a parent record for a legacy device node.
///
/// Identity comes from the per-unit `dev.<driver>.<unit>` sysctl
/// tree. Devices without a trailing unit number carry no such tree
/// and are left without a parent, as is any device whose description,
/// pnpinfo or parent-driver query fails.
pub fn set_legacy_parent(device: &mut Device, sysctl: &dyn SysctlSource) {
    let sysname = device.sysname().to_string();
    let Some((driver, unit)) = split_unit(&sysname) else {
        log::debug!("{}: no unit number, skipping parent synthesis", sysname);
        return;
    };

    let desc = match sysctl.string_value(&format!("dev.{}.{}.%desc", driver, unit)) {
        Ok(desc) => desc,
        Err(err) => {
            log::debug!("{}: no description ({})", sysname, err);
            return;
        }
    };
    let pnpinfo = match sysctl.string_value(&format!("dev.{}.{}.%pnpinfo", driver, unit)) {
        Ok(pnpinfo) => pnpinfo,
        Err(err) => {
            log::debug!("{}: no pnpinfo ({})", sysname, err);
            return;
        }
    };
    let parent_driver = match sysctl.string_value(&format!("dev.{}.{}.%parent", driver, unit)) {
        Ok(parent_driver) => parent_driver,
        Err(err) => {
            log::debug!("{}: no parent driver ({})", sysname, err);
            return;
        }
    };

    let name = strip_name(&desc);
    let pnp = PnpInfo::parse(&pnpinfo);

    let (bus, vendor, product) = match (pnp.vendor(), pnp.product(), pnp.device()) {
        (Some(vendor), Some(product), _) => {
            // TODO: compare the parent driver against uhub* instead
            // of assuming vendor+product always means USB.
            (BUS_USB, parse_number(vendor), parse_number(product))
        }
        (Some(vendor), None, Some(dev)) => (BUS_PCI, parse_number(vendor), parse_number(dev)),
        _ => {
            if parent_driver == "atkbdc0" {
                let (vendor, product) = match driver {
                    "atkbd" => (PS2_KEYBOARD_VENDOR, PS2_KEYBOARD_PRODUCT),
                    "psm" => (PS2_MOUSE_VENDOR, PS2_MOUSE_GENERIC_PRODUCT),
                    _ => (0, 0),
                };
                (BUS_I8042, vendor, product)
            } else {
                (BUS_VIRTUAL, 0, 0)
            }
        }
    };

    let product_str = format!("{:x}/{:x}/{:x}/0", bus, vendor, product);
    log::debug!("{}: parent {} {}", sysname, name, product_str);
    let parent = synthesize_parent(&sysname, name, Some(&product_str), pnp.pnp_id());
    device.set_parent(parent);
}
