//! BLE notify adapter.
//!
//! Implements [`EventSink`] by pushing encoded events to a connected phone
//! as GATT notifications.  The mug is a plain peripheral: one primary
//! service, two notify-only characteristics, no writes, no pairing.
//!
//! ## cfg gating
//!
//! - **`target_os = "espidf"`**: Bluedroid GATT server via raw `esp_idf_svc::sys` calls.
//! - **all other targets**: simulation that records every notification.
//!
//! ## GATT Service Layout
//!
//! | Characteristic | UUID                                   | Props  | Carries          |
//! |----------------|----------------------------------------|--------|------------------|
//! | Lid            | `00002a56-0000-1000-8000-00805f9b34fb` | Notify | `LID_*` events   |
//! | Drink          | `00002a57-0000-1000-8000-00805f9b34fb` | Notify | net-change events|
//!
//! Service UUID `4fafc201-1fb5-459e-8fcc-c5c9c331914b`.  Each characteristic
//! has a CCCD (0x2902) so clients can subscribe.
//!
//! ## Connection lifecycle
//!
//! ```text
//!   Disconnected ──connect──▶ Connected
//!        ▲                        │
//!        └──disconnect (re-advertise)
//! ```
//!
//! Publishing never fails upward: while disconnected the event is only
//! logged, and the phone catches up on the next change.

use core::fmt;
use log::{debug, info, warn};

use crate::app::events::MugEvent;
use crate::app::ports::EventSink;
use crate::config::{MAX_DEVICE_NAME_LEN, WireFormat};
use crate::error::CommsError;

use super::wire::{self, Payload};

// ───────────────────────────────────────────────────────────────
// Constants
// ───────────────────────────────────────────────────────────────

pub const SERVICE_UUID: u128 = 0x4faf_c201_1fb5_459e_8fcc_c5c9_c331_914b;
pub const CHAR_LID_UUID: u128 = 0x0000_2a56_0000_1000_8000_0080_5f9b_34fb;
pub const CHAR_DRINK_UUID: u128 = 0x0000_2a57_0000_1000_8000_0080_5f9b_34fb;
pub const CCCD_UUID16: u16 = 0x2902;

/// Service + 2 × (declaration + value + CCCD).
#[cfg(target_os = "espidf")]
const SERVICE_NUM_HANDLES: u16 = 8;

// ───────────────────────────────────────────────────────────────
// Connection status and routing
// ───────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionStatus {
    Connected,
    Disconnected,
}

/// Which notify characteristic an event goes out on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Characteristic {
    Lid,
    Drink,
}

impl Characteristic {
    pub fn for_event(event: &MugEvent) -> Self {
        match event {
            MugEvent::Lid(_) => Self::Lid,
            MugEvent::NetChange(_) => Self::Drink,
        }
    }
}

/// Result of one publish attempt, for logging and tests.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotifyOutcome {
    Notified,
    NotConnected,
    Failed,
}

impl fmt::Display for NotifyOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Notified => write!(f, "Notified"),
            Self::NotConnected => write!(f, "Not connected"),
            Self::Failed => write!(f, "Notify failed"),
        }
    }
}

// ── ESP-IDF BLE static state ──────────────────────────────────
//
// Bluedroid callbacks are C function pointers that cannot capture Rust
// closures.  These atomics bridge the callback context to the adapter.

#[cfg(target_os = "espidf")]
use core::sync::atomic::{AtomicBool, AtomicU32, Ordering as AtomicOrdering};

#[cfg(target_os = "espidf")]
static BLE_GATTS_IF: AtomicU32 = AtomicU32::new(0);
#[cfg(target_os = "espidf")]
static BLE_CONN_ID: AtomicU32 = AtomicU32::new(0);
#[cfg(target_os = "espidf")]
static BLE_CONNECTED: AtomicBool = AtomicBool::new(false);
#[cfg(target_os = "espidf")]
static BLE_SVC_HANDLE: AtomicU32 = AtomicU32::new(0);
#[cfg(target_os = "espidf")]
static BLE_LID_CHAR_HANDLE: AtomicU32 = AtomicU32::new(0);
#[cfg(target_os = "espidf")]
static BLE_DRINK_CHAR_HANDLE: AtomicU32 = AtomicU32::new(0);
#[cfg(target_os = "espidf")]
static BLE_ATTR_STEP: AtomicU32 = AtomicU32::new(0);

#[cfg(target_os = "espidf")]
static SERVICE_UUID_LE: [u8; 16] = SERVICE_UUID.to_le_bytes();

#[cfg(target_os = "espidf")]
fn uuid128_to_esp(uuid: u128) -> esp_idf_svc::sys::esp_bt_uuid_t {
    let mut t: esp_idf_svc::sys::esp_bt_uuid_t = unsafe { core::mem::zeroed() };
    t.len = 16;
    t.uuid.uuid128 = uuid.to_le_bytes();
    t
}

#[cfg(target_os = "espidf")]
fn uuid16_to_esp(uuid: u16) -> esp_idf_svc::sys::esp_bt_uuid_t {
    let mut t: esp_idf_svc::sys::esp_bt_uuid_t = unsafe { core::mem::zeroed() };
    t.len = 2;
    t.uuid.uuid16 = uuid;
    t
}

#[cfg(target_os = "espidf")]
unsafe fn add_notify_char(svc_handle: u16, uuid: u128) {
    use esp_idf_svc::sys::*;
    let mut char_uuid = uuid128_to_esp(uuid);
    unsafe {
        esp_ble_gatts_add_char(
            svc_handle,
            &mut char_uuid,
            ESP_GATT_PERM_READ as esp_gatt_perm_t,
            ESP_GATT_CHAR_PROP_BIT_NOTIFY as esp_gatt_char_prop_t,
            core::ptr::null_mut(),
            core::ptr::null_mut(),
        );
    }
}

#[cfg(target_os = "espidf")]
unsafe fn add_cccd(svc_handle: u16) {
    use esp_idf_svc::sys::*;
    let mut descr_uuid = uuid16_to_esp(CCCD_UUID16);
    unsafe {
        esp_ble_gatts_add_char_descr(
            svc_handle,
            &mut descr_uuid,
            (ESP_GATT_PERM_READ | ESP_GATT_PERM_WRITE) as esp_gatt_perm_t,
            core::ptr::null_mut(),
            core::ptr::null_mut(),
        );
    }
}

#[cfg(target_os = "espidf")]
unsafe fn start_advertising() -> i32 {
    use esp_idf_svc::sys::*;
    unsafe {
        let mut adv_params = esp_ble_adv_params_t {
            adv_int_min: 0x20,
            adv_int_max: 0x40,
            adv_type: esp_ble_adv_type_t_ADV_TYPE_IND,
            own_addr_type: esp_ble_addr_type_t_BLE_ADDR_TYPE_PUBLIC,
            channel_map: esp_ble_adv_channel_t_ADV_CHNL_ALL,
            adv_filter_policy: esp_ble_adv_filter_t_ADV_FILTER_ALLOW_SCAN_ANY_CON_ANY,
            ..core::mem::zeroed()
        };
        esp_ble_gap_start_advertising(&mut adv_params)
    }
}

#[cfg(target_os = "espidf")]
unsafe extern "C" fn ble_gap_event_handler(
    event: esp_idf_svc::sys::esp_gap_ble_cb_event_t,
    _param: *mut esp_idf_svc::sys::esp_ble_gap_cb_param_t,
) {
    use esp_idf_svc::sys::*;
    match event {
        esp_gap_ble_cb_event_t_ESP_GAP_BLE_ADV_DATA_SET_COMPLETE_EVT => {
            log::debug!("BLE GAP: advertising data set");
        }
        // Scan response is configured last; once it lands, go live.
        esp_gap_ble_cb_event_t_ESP_GAP_BLE_SCAN_RSP_DATA_SET_COMPLETE_EVT => {
            let ret = unsafe { start_advertising() };
            if ret != ESP_OK as i32 {
                log::warn!("BLE GAP: start advertising failed ({})", ret);
            }
        }
        esp_gap_ble_cb_event_t_ESP_GAP_BLE_ADV_START_COMPLETE_EVT => {
            log::info!("BLE GAP: advertising started");
        }
        esp_gap_ble_cb_event_t_ESP_GAP_BLE_ADV_STOP_COMPLETE_EVT => {
            log::info!("BLE GAP: advertising stopped");
        }
        _ => {}
    }
}

#[cfg(target_os = "espidf")]
unsafe extern "C" fn ble_gatts_event_handler(
    event: esp_idf_svc::sys::esp_gatts_cb_event_t,
    gatts_if: esp_idf_svc::sys::esp_gatt_if_t,
    param: *mut esp_idf_svc::sys::esp_ble_gatts_cb_param_t,
) {
    use esp_idf_svc::sys::*;

    match event {
        esp_gatts_cb_event_t_ESP_GATTS_REG_EVT => {
            BLE_GATTS_IF.store(gatts_if as u32, AtomicOrdering::Relaxed);
            log::info!("BLE GATTS: app registered (if={})", gatts_if);
            let mut svc_id = esp_gatt_srvc_id_t {
                id: esp_gatt_id_t {
                    uuid: uuid128_to_esp(SERVICE_UUID),
                    inst_id: 0,
                },
                is_primary: true,
            };
            unsafe { esp_ble_gatts_create_service(gatts_if, &mut svc_id, SERVICE_NUM_HANDLES) };
        }
        esp_gatts_cb_event_t_ESP_GATTS_CREATE_EVT => {
            let svc_handle = unsafe { (*param).create.service_handle };
            BLE_SVC_HANDLE.store(svc_handle as u32, AtomicOrdering::Relaxed);
            log::info!("BLE GATTS: service created (handle={})", svc_handle);
            unsafe { esp_ble_gatts_start_service(svc_handle) };
            BLE_ATTR_STEP.store(1, AtomicOrdering::Relaxed);
            unsafe { add_notify_char(svc_handle, CHAR_LID_UUID) };
        }
        // Attributes are added one at a time: lid, its CCCD, drink, its CCCD.
        esp_gatts_cb_event_t_ESP_GATTS_ADD_CHAR_EVT => {
            let handle = unsafe { (*param).add_char.attr_handle };
            let svc_handle = BLE_SVC_HANDLE.load(AtomicOrdering::Relaxed) as u16;
            match BLE_ATTR_STEP.load(AtomicOrdering::Relaxed) {
                1 => {
                    BLE_LID_CHAR_HANDLE.store(handle as u32, AtomicOrdering::Relaxed);
                    log::info!("BLE GATTS: lid char (handle={})", handle);
                    BLE_ATTR_STEP.store(2, AtomicOrdering::Relaxed);
                    unsafe { add_cccd(svc_handle) };
                }
                3 => {
                    BLE_DRINK_CHAR_HANDLE.store(handle as u32, AtomicOrdering::Relaxed);
                    log::info!("BLE GATTS: drink char (handle={})", handle);
                    BLE_ATTR_STEP.store(4, AtomicOrdering::Relaxed);
                    unsafe { add_cccd(svc_handle) };
                }
                _ => {}
            }
        }
        esp_gatts_cb_event_t_ESP_GATTS_ADD_CHAR_DESCR_EVT => {
            let svc_handle = BLE_SVC_HANDLE.load(AtomicOrdering::Relaxed) as u16;
            match BLE_ATTR_STEP.load(AtomicOrdering::Relaxed) {
                2 => {
                    BLE_ATTR_STEP.store(3, AtomicOrdering::Relaxed);
                    unsafe { add_notify_char(svc_handle, CHAR_DRINK_UUID) };
                }
                4 => {
                    BLE_ATTR_STEP.store(5, AtomicOrdering::Relaxed);
                    log::info!("BLE GATTS: all attributes registered");
                }
                _ => {}
            }
        }
        esp_gatts_cb_event_t_ESP_GATTS_CONNECT_EVT => {
            let conn_id = unsafe { (*param).connect.conn_id };
            BLE_CONN_ID.store(conn_id as u32, AtomicOrdering::Relaxed);
            BLE_CONNECTED.store(true, AtomicOrdering::Release);
            log::info!("BLE GATTS: client connected (conn_id={})", conn_id);
        }
        esp_gatts_cb_event_t_ESP_GATTS_DISCONNECT_EVT => {
            BLE_CONNECTED.store(false, AtomicOrdering::Release);
            log::info!("BLE GATTS: client disconnected, re-advertising");
            let ret = unsafe { start_advertising() };
            if ret != ESP_OK as i32 {
                log::warn!("BLE GATTS: re-advertise failed ({})", ret);
            }
        }
        // CCCD writes: acknowledge so the client's subscribe succeeds.
        esp_gatts_cb_event_t_ESP_GATTS_WRITE_EVT => {
            let p = unsafe { &(*param).write };
            if p.need_rsp {
                unsafe {
                    esp_ble_gatts_send_response(
                        gatts_if,
                        p.conn_id,
                        p.trans_id,
                        esp_gatt_status_t_ESP_GATT_OK,
                        core::ptr::null_mut(),
                    );
                }
            }
        }
        _ => {}
    }
}

// ───────────────────────────────────────────────────────────────
// BLE adapter
// ───────────────────────────────────────────────────────────────

pub struct BleAdapter {
    device_name: heapless::String<MAX_DEVICE_NAME_LEN>,
    format: WireFormat,
    started: bool,
    #[cfg(not(target_os = "espidf"))]
    sim_status: ConnectionStatus,
    /// Simulation: every notification that would have gone over the air.
    #[cfg(not(target_os = "espidf"))]
    sim_sent: Vec<(Characteristic, Payload)>,
    #[cfg(not(target_os = "espidf"))]
    sim_adv_starts: u32,
}

impl BleAdapter {
    pub fn new(device_name: heapless::String<MAX_DEVICE_NAME_LEN>, format: WireFormat) -> Self {
        Self {
            device_name,
            format,
            started: false,
            #[cfg(not(target_os = "espidf"))]
            sim_status: ConnectionStatus::Disconnected,
            #[cfg(not(target_os = "espidf"))]
            sim_sent: Vec::new(),
            #[cfg(not(target_os = "espidf"))]
            sim_adv_starts: 0,
        }
    }

    /// Bring up the stack and start advertising.
    pub fn start(&mut self) -> Result<(), CommsError> {
        if self.started {
            return Ok(());
        }
        info!("BLE: starting, advertising as '{}'", self.device_name);
        self.platform_start()?;
        self.started = true;
        Ok(())
    }

    pub fn is_started(&self) -> bool {
        self.started
    }

    /// Current link state, as last reported by the stack.
    #[cfg(target_os = "espidf")]
    pub fn connection_status(&self) -> ConnectionStatus {
        if BLE_CONNECTED.load(AtomicOrdering::Acquire) {
            ConnectionStatus::Connected
        } else {
            ConnectionStatus::Disconnected
        }
    }

    #[cfg(not(target_os = "espidf"))]
    pub fn connection_status(&self) -> ConnectionStatus {
        self.sim_status
    }

    /// Encode and notify one event on its characteristic.
    pub fn notify(&mut self, event: &MugEvent) -> NotifyOutcome {
        let payload = match wire::encode(event, self.format) {
            Ok(p) => p,
            Err(e) => {
                warn!("BLE: cannot encode {:?}: {}", event, e);
                return NotifyOutcome::Failed;
            }
        };
        let characteristic = Characteristic::for_event(event);
        let outcome = if !self.started
            || self.connection_status() == ConnectionStatus::Disconnected
        {
            NotifyOutcome::NotConnected
        } else {
            self.platform_notify(characteristic, &payload)
        };
        debug!("BLE {:?}: {}", characteristic, outcome);
        outcome
    }

    // ── Platform-specific ─────────────────────────────────────

    #[cfg(target_os = "espidf")]
    fn platform_start(&mut self) -> Result<(), CommsError> {
        use esp_idf_svc::sys::*;
        unsafe {
            // C3 has no Classic BT; releasing its pool is harmless and frees RAM.
            esp_bt_controller_mem_release(esp_bt_mode_t_ESP_BT_MODE_CLASSIC_BT);

            let mut bt_cfg = esp_bt_controller_config_t::default();
            let ret = esp_bt_controller_init(&mut bt_cfg);
            if ret != ESP_OK as i32 {
                log::error!("BLE: bt_controller_init failed ({})", ret);
                return Err(CommsError::BleInitFailed(ret));
            }

            let ret = esp_bt_controller_enable(esp_bt_mode_t_ESP_BT_MODE_BLE);
            if ret != ESP_OK as i32 {
                log::error!("BLE: bt_controller_enable failed ({})", ret);
                return Err(CommsError::BleInitFailed(ret));
            }

            let ret = esp_bluedroid_init();
            if ret != ESP_OK as i32 {
                log::error!("BLE: bluedroid_init failed ({})", ret);
                return Err(CommsError::BleInitFailed(ret));
            }

            let ret = esp_bluedroid_enable();
            if ret != ESP_OK as i32 {
                log::error!("BLE: bluedroid_enable failed ({})", ret);
                return Err(CommsError::BleInitFailed(ret));
            }

            esp_ble_gap_register_callback(Some(ble_gap_event_handler));
            esp_ble_gatts_register_callback(Some(ble_gatts_event_handler));

            // NUL-terminated copy; Bluedroid copies it internally.
            let mut name = heapless::Vec::<u8, { MAX_DEVICE_NAME_LEN + 1 }>::new();
            let _ = name.extend_from_slice(self.device_name.as_bytes());
            let _ = name.push(0);
            esp_ble_gap_set_device_name(name.as_ptr().cast());

            // Advertising packet: flags + 128-bit service UUID.
            let mut adv_data = esp_ble_adv_data_t {
                set_scan_rsp: false,
                include_name: false,
                service_uuid_len: SERVICE_UUID_LE.len() as u16,
                p_service_uuid: SERVICE_UUID_LE.as_ptr().cast_mut(),
                flag: (ESP_BLE_ADV_FLAG_GEN_DISC | ESP_BLE_ADV_FLAG_BREDR_NOT_SPT) as u8,
                ..core::mem::zeroed()
            };
            let ret = esp_ble_gap_config_adv_data(&mut adv_data);
            if ret != ESP_OK as i32 {
                return Err(CommsError::AdvertisingFailed(ret));
            }

            // Scan response: the device name.  Advertising starts once this lands.
            let mut scan_rsp = esp_ble_adv_data_t {
                set_scan_rsp: true,
                include_name: true,
                ..core::mem::zeroed()
            };
            let ret = esp_ble_gap_config_adv_data(&mut scan_rsp);
            if ret != ESP_OK as i32 {
                return Err(CommsError::AdvertisingFailed(ret));
            }

            esp_ble_gatts_app_register(0);
        }
        info!("BLE(espidf): Bluedroid stack initialized");
        Ok(())
    }

    #[cfg(not(target_os = "espidf"))]
    fn platform_start(&mut self) -> Result<(), CommsError> {
        self.sim_adv_starts += 1;
        info!(
            "BLE(sim): advertising '{}' (service {:032x})",
            self.device_name, SERVICE_UUID
        );
        Ok(())
    }

    #[cfg(target_os = "espidf")]
    fn platform_notify(&mut self, characteristic: Characteristic, payload: &str) -> NotifyOutcome {
        use esp_idf_svc::sys::*;
        let handle = match characteristic {
            Characteristic::Lid => BLE_LID_CHAR_HANDLE.load(AtomicOrdering::Relaxed),
            Characteristic::Drink => BLE_DRINK_CHAR_HANDLE.load(AtomicOrdering::Relaxed),
        };
        if handle == 0 {
            return NotifyOutcome::Failed;
        }
        let ret = unsafe {
            esp_ble_gatts_send_indicate(
                BLE_GATTS_IF.load(AtomicOrdering::Relaxed) as esp_gatt_if_t,
                BLE_CONN_ID.load(AtomicOrdering::Relaxed) as u16,
                handle as u16,
                payload.len() as u16,
                payload.as_ptr().cast_mut(),
                false,
            )
        };
        if ret == ESP_OK as i32 {
            NotifyOutcome::Notified
        } else {
            warn!("BLE: send_indicate failed ({})", ret);
            NotifyOutcome::Failed
        }
    }

    #[cfg(not(target_os = "espidf"))]
    fn platform_notify(&mut self, characteristic: Characteristic, payload: &str) -> NotifyOutcome {
        let mut owned = Payload::new();
        if owned.push_str(payload).is_err() {
            return NotifyOutcome::Failed;
        }
        self.sim_sent.push((characteristic, owned));
        NotifyOutcome::Notified
    }

    // ── Simulation hooks ──────────────────────────────────────

    #[cfg(not(target_os = "espidf"))]
    pub fn sim_connect(&mut self) {
        info!("BLE(sim): central connected");
        self.sim_status = ConnectionStatus::Connected;
    }

    /// Drop the link and re-advertise, as the GATTS handler does on hardware.
    #[cfg(not(target_os = "espidf"))]
    pub fn sim_disconnect(&mut self) {
        info!("BLE(sim): central disconnected, re-advertising");
        self.sim_status = ConnectionStatus::Disconnected;
        self.sim_adv_starts += 1;
    }

    #[cfg(not(target_os = "espidf"))]
    pub fn sim_sent(&self) -> &[(Characteristic, Payload)] {
        &self.sim_sent
    }

    #[cfg(not(target_os = "espidf"))]
    pub fn sim_adv_starts(&self) -> u32 {
        self.sim_adv_starts
    }
}

// ───────────────────────────────────────────────────────────────
// EventSink implementation
// ───────────────────────────────────────────────────────────────

impl EventSink for BleAdapter {
    fn publish(&mut self, event: &MugEvent) {
        let _ = self.notify(event);
    }
}

// ───────────────────────────────────────────────────────────────
// Tests
// ───────────────────────────────────────────────────────────────
