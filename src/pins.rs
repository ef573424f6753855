//! GPIO / peripheral pin assignments for the SmartMug base (Seeed XIAO ESP32-C3).
//!
//! Single source of truth: drivers reference this module rather than
//! hard-coding pin numbers.  XIAO silk-screen labels are given next to
//! each GPIO.

// ---------------------------------------------------------------------------
// Lid reed switch
// ---------------------------------------------------------------------------

/// Digital input (D3): reed switch in the lid hinge, wired to GND.
/// Internal pull-up; LOW = lid closed (magnet present), HIGH = lid open.
pub const LID_REED_GPIO: i32 = 5;

// ---------------------------------------------------------------------------
// I²C bus (M5Stack Unit Scales)
// ---------------------------------------------------------------------------

/// D4
pub const I2C_SDA_GPIO: i32 = 6;
/// D5
pub const I2C_SCL_GPIO: i32 = 7;
/// Unit Scales firmware is rated for standard-mode I²C.
pub const I2C_BAUDRATE_KHZ: u32 = 100;
