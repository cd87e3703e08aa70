//! Device identity derived from the ESP32 factory MAC address.
//!
//! `FS-XXYYZZ` (last 3 MAC bytes, uppercase hex) tags every telemetry
//! record; `firesuppress-xxyyzz` is the network hostname and MQTT client id.

use core::fmt::Write;

/// "FS-XXYYZZ" is 9 chars.
pub type DeviceIdString = heapless::String<16>;

pub type MacAddress = [u8; 6];

#[cfg(target_os = "espidf")]
pub fn read_mac() -> MacAddress {
    let mut mac: MacAddress = [0u8; 6];
    unsafe {
        esp_idf_svc::sys::esp_efuse_mac_get_default(mac.as_mut_ptr());
    }
    mac
}

/// Simulation: a fixed MAC.
#[cfg(not(target_os = "espidf"))]
pub fn read_mac() -> MacAddress {
    [0xDE, 0xAD, 0xBE, 0xEF, 0xCA, 0xFE]
}

pub fn device_id(mac: &MacAddress) -> DeviceIdString {
    let mut id = DeviceIdString::new();
    let _ = write!(id, "FS-{:02X}{:02X}{:02X}", mac[3], mac[4], mac[5]);
    id
}

pub fn hostname(mac: &MacAddress) -> heapless::String<24> {
    let mut name = heapless::String::<24>::new();
    let _ = write!(name, "firesuppress-{:02x}{:02x}{:02x}", mac[3], mac[4], mac[5]);
    name
}
