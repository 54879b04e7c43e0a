//! Device discovery: finds a USB device matching the adaptor's VID/PID and
//! identity strings (§6). Enumeration and descriptor internals are
//! `rusb`'s concern, not this crate's — per the governing spec's
//! Non-goals, we only ever match on identity, never reimplement USB stack
//! internals.

use std::time::Duration;

use swd_proto::{USB_MANUFACTURER, USB_PRODUCT, USB_PRODUCT_ID, USB_VENDOR_ID};

use crate::error::HostError;

const STRING_DESCRIPTOR_TIMEOUT: Duration = Duration::from_millis(200);

/// Opens the first matching adaptor found, verifying both VID/PID and the
/// manufacturer/product strings (some other vendor could reuse the same
/// bare VID/PID pair).
pub fn open_adaptor() -> Result<rusb::DeviceHandle<rusb::GlobalContext>, HostError> {
    for device in rusb::devices()?.iter() {
        let descriptor = match device.device_descriptor() {
            Ok(d) => d,
            Err(_) => continue,
        };
        if descriptor.vendor_id() != USB_VENDOR_ID || descriptor.product_id() != USB_PRODUCT_ID {
            continue;
        }
        let handle = match device.open() {
            Ok(h) => h,
            Err(_) => continue,
        };
        if !strings_match(&handle, &descriptor) {
            continue;
        }
        return Ok(handle);
    }
    Err(HostError::DeviceNotFound)
}

fn strings_match(
    handle: &rusb::DeviceHandle<rusb::GlobalContext>,
    descriptor: &rusb::DeviceDescriptor,
) -> bool {
    let languages = match handle.read_languages(STRING_DESCRIPTOR_TIMEOUT) {
        Ok(l) => l,
        Err(_) => return false,
    };
    let Some(language) = languages.first().copied() else {
        return false;
    };

    let manufacturer = descriptor
        .manufacturer_string_index()
        .and_then(|idx| {
            handle
                .read_string_descriptor(language, idx, STRING_DESCRIPTOR_TIMEOUT)
                .ok()
        })
        .unwrap_or_default();
    let product = descriptor
        .product_string_index()
        .and_then(|idx| {
            handle
                .read_string_descriptor(language, idx, STRING_DESCRIPTOR_TIMEOUT)
                .ok()
        })
        .unwrap_or_default();

    manufacturer == USB_MANUFACTURER && product == USB_PRODUCT
}
