//! Sensor adapters and the trigger map
//!
//! Three sensors drive the cube:
//!
//! - [`RangeSensor`]: an HC-SR04-style ultrasonic ranger on two GPIO pins
//! - [`PhotoSensor`]: a photoresistor read through a caller-supplied ADC
//! - [`TouchSensor`]: an MPR121 capacitive touch controller on I2C
//!
//! Each adapter is polled with the current time and rate-limits itself.
//! The caller gathers their latest values into a [`SensorSnapshot`], and
//! [`Triggers`] turns changes between snapshots into mode [`Action`]s.
//!
//! ## Example
//!
//! ```
//! use cube_lights::sensor::{SensorSnapshot, Triggers};
//! use cube_lights::Action;
//!
//! let mut triggers = Triggers::new();
//! let idle = SensorSnapshot::default();
//! assert_eq!(triggers.update(&idle).count(), 0);
//!
//! let pressed = SensorSnapshot { touched: 0b01, ..idle };
//! let mut actions = triggers.update(&pressed);
//! assert_eq!(actions.next(), Some(Action::NextMode));
//! ```

use core::convert::Infallible;
use core::fmt::Debug;
use embedded_hal::delay::DelayNs;
use embedded_hal::digital::{InputPin, OutputPin};
use embedded_hal::i2c::I2c;

use crate::mode::Action;

/// Errors that can occur while reading a sensor
///
/// Generic over the bus and GPIO error types.
#[derive(Debug)]
pub enum SensorError<BusErr, PinErr> {
    /// I2C bus error
    Bus(BusErr),
    /// GPIO pin error
    Pin(PinErr),
    /// No response within the allowed time
    Timeout,
    /// Touch channel index past the last electrode
    InvalidChannel {
        /// The requested channel
        channel: u8,
    },
}

impl<BusErr: Debug, PinErr: Debug> core::fmt::Display for SensorError<BusErr, PinErr> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::Bus(e) => write!(f, "Bus error: {e:?}"),
            Self::Pin(e) => write!(f, "Pin error: {e:?}"),
            Self::Timeout => write!(f, "Timeout waiting for sensor"),
            Self::InvalidChannel { channel } => {
                write!(f, "Touch channel {channel} out of range (max {})", TOUCH_CHANNELS - 1)
            }
        }
    }
}

impl<BusErr: Debug, PinErr: Debug> core::error::Error for SensorError<BusErr, PinErr> {}

/// Whether `now_ms` has reached `deadline_ms`, tolerating counter wrap
#[allow(clippy::cast_possible_wrap)]
pub(crate) const fn reached(now_ms: u32, deadline_ms: u32) -> bool {
    now_ms.wrapping_sub(deadline_ms) as i32 >= 0
}

/// Latest values of every sensor
///
/// A range of 0 means no echo has been seen yet.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SensorSnapshot {
    /// Distance to the nearest object in centimeters
    pub range_cm: u16,
    /// Raw light level, higher is brighter
    pub light: u16,
    /// Whether the light level is in the dark band
    pub dark: bool,
    /// Bit `n` set while touch channel `n` is held
    pub touched: u16,
}

impl SensorSnapshot {
    /// Whether touch channel `channel` is held
    pub const fn is_touched(&self, channel: usize) -> bool {
        channel < TOUCH_CHANNELS && self.touched & (1 << channel) != 0
    }
}

// ---------------------------------------------------------------------------
// Range

/// Minimum time between pings in milliseconds
pub const PING_DELAY_MS: u32 = 50;
/// Farthest distance measured in centimeters
pub const PING_MAX_CM: u16 = 200;
/// Echo time in microseconds for one centimeter of distance
pub const US_ROUNDTRIP_CM: u32 = 57;
/// Longest wait for the echo pulse to start in microseconds
const ECHO_START_TIMEOUT_US: u32 = 5_000;

/// Ultrasonic ranger driven by a trigger and an echo pin
///
/// A ping that times out or returns past [`PING_MAX_CM`] leaves the last
/// good distance in place.
pub struct RangeSensor<TRIG, ECHO> {
    trig: TRIG,
    echo: ECHO,
    max_cm: u16,
    range_cm: u16,
    next_ping_ms: u32,
}

impl<TRIG, ECHO, PinErr> RangeSensor<TRIG, ECHO>
where
    TRIG: OutputPin<Error = PinErr>,
    ECHO: InputPin<Error = PinErr>,
    PinErr: Debug,
{
    /// Create a ranger on the given pins
    pub const fn new(trig: TRIG, echo: ECHO) -> Self {
        Self {
            trig,
            echo,
            max_cm: PING_MAX_CM,
            range_cm: 0,
            next_ping_ms: 0,
        }
    }

    /// Set the farthest distance that counts as an echo
    pub fn set_max_cm(&mut self, max_cm: u16) -> &mut Self {
        self.max_cm = max_cm;
        self
    }

    /// Last measured distance in centimeters
    pub const fn range_cm(&self) -> u16 {
        self.range_cm
    }

    /// Ping if the rate limit allows and return the latest distance
    ///
    /// # Errors
    ///
    /// Returns [`SensorError::Pin`] if a pin cannot be driven or read.
    pub fn poll<D: DelayNs>(
        &mut self,
        now_ms: u32,
        delay: &mut D,
    ) -> Result<u16, SensorError<Infallible, PinErr>> {
        if !reached(now_ms, self.next_ping_ms) {
            return Ok(self.range_cm);
        }
        self.next_ping_ms = now_ms.wrapping_add(PING_DELAY_MS);

        match self.ping(delay) {
            Ok(cm) => self.range_cm = cm,
            Err(SensorError::Timeout) => log::trace!("ping timeout, keeping {} cm", self.range_cm),
            Err(e) => return Err(e),
        }
        Ok(self.range_cm)
    }

    /// Send one ping and time its echo
    ///
    /// # Errors
    ///
    /// Returns [`SensorError::Timeout`] if no echo arrives within range.
    pub fn ping<D: DelayNs>(&mut self, delay: &mut D) -> Result<u16, SensorError<Infallible, PinErr>> {
        self.trig.set_low().map_err(SensorError::Pin)?;
        delay.delay_us(2);
        self.trig.set_high().map_err(SensorError::Pin)?;
        delay.delay_us(10);
        self.trig.set_low().map_err(SensorError::Pin)?;

        let mut waited = 0u32;
        while !self.echo.is_high().map_err(SensorError::Pin)? {
            if waited >= ECHO_START_TIMEOUT_US {
                return Err(SensorError::Timeout);
            }
            delay.delay_us(1);
            waited += 1;
        }

        let max_us = u32::from(self.max_cm) * US_ROUNDTRIP_CM;
        let mut width = 0u32;
        while self.echo.is_high().map_err(SensorError::Pin)? {
            if width > max_us {
                return Err(SensorError::Timeout);
            }
            delay.delay_us(1);
            width += 1;
        }

        Ok((width / US_ROUNDTRIP_CM) as u16)
    }

    /// Release the pins
    pub fn release(self) -> (TRIG, ECHO) {
        (self.trig, self.echo)
    }
}

// ---------------------------------------------------------------------------
// Photo

/// Minimum time between light readings in milliseconds
pub const PHOTO_DELAY_MS: u32 = 100;
/// Readings below this enter the dark band
pub const PHOTO_THRESHOLD_LOW: u16 = 400;
/// Readings above this leave the dark band
pub const PHOTO_THRESHOLD_HIGH: u16 = 600;
/// Reading assumed before the first sample, full-scale for a 10-bit ADC
pub const PHOTO_INITIAL: u16 = 1024;

/// Photoresistor with a hysteresis band
///
/// There is no ADC trait in `embedded-hal` 1.0, so the reading comes from
/// a closure. Between the two thresholds the dark flag keeps its value.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PhotoSensor {
    low: u16,
    high: u16,
    value: u16,
    dark: bool,
    next_sample_ms: u32,
}

impl Default for PhotoSensor {
    fn default() -> Self {
        Self::new(PHOTO_THRESHOLD_LOW, PHOTO_THRESHOLD_HIGH)
    }
}

impl PhotoSensor {
    /// Create a sensor with the given thresholds
    ///
    /// `low` should not exceed `high`; if it does the two are swapped.
    pub const fn new(low: u16, high: u16) -> Self {
        let (low, high) = if low <= high { (low, high) } else { (high, low) };
        Self {
            low,
            high,
            value: PHOTO_INITIAL,
            dark: false,
            next_sample_ms: 0,
        }
    }

    /// Last raw reading
    pub const fn value(&self) -> u16 {
        self.value
    }

    /// Whether the light level is in the dark band
    pub const fn is_dark(&self) -> bool {
        self.dark
    }

    /// Feed one raw reading through the hysteresis band
    pub fn sample(&mut self, raw: u16) -> bool {
        self.value = raw;
        if raw < self.low {
            self.dark = true;
        } else if raw > self.high {
            self.dark = false;
        }
        self.dark
    }

    /// Read the sensor if the rate limit allows and return the dark flag
    ///
    /// # Errors
    ///
    /// Returns the error of `read` unchanged.
    pub fn poll<F, E>(&mut self, now_ms: u32, read: F) -> Result<bool, E>
    where
        F: FnOnce() -> Result<u16, E>,
    {
        if reached(now_ms, self.next_sample_ms) {
            self.next_sample_ms = now_ms.wrapping_add(PHOTO_DELAY_MS);
            let raw = read()?;
            self.sample(raw);
            log::trace!("photo={} dark={}", raw, self.dark);
        }
        Ok(self.dark)
    }
}

// ---------------------------------------------------------------------------
// Touch

/// Electrodes on an MPR121
pub const TOUCH_CHANNELS: usize = 12;
/// Default MPR121 I2C address (ADDR pin to ground)
pub const MPR121_ADDRESS: u8 = 0x5A;
/// Minimum time between polled reads in milliseconds
pub const CAP_DELAY_MS: u32 = 50;
/// Default touch threshold
pub const DEFAULT_TOUCH_THRESHOLD: u8 = 6;
/// Default release threshold
pub const DEFAULT_RELEASE_THRESHOLD: u8 = 2;

mod reg {
    pub const TOUCH_STATUS: u8 = 0x00;
    pub const ELE0_TOUCH: u8 = 0x41;
    pub const DEBOUNCE: u8 = 0x5B;
    pub const ECR: u8 = 0x5E;
    pub const SOFT_RESET: u8 = 0x80;
    pub const RESET_VALUE: u8 = 0x63;
}

/// Debounce count written to the controller for touch and release
const DEBOUNCE_SAMPLES: u8 = 0x22;
const STATUS_MASK: u16 = (1 << TOUCH_CHANNELS) - 1;

/// How the touch controller is read
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TouchMode {
    /// Read only when the IRQ line reported a change
    Interrupt,
    /// Read every `interval_ms`
    Poll {
        /// Time between reads
        interval_ms: u32,
    },
}

impl Default for TouchMode {
    fn default() -> Self {
        Self::Poll {
            interval_ms: CAP_DELAY_MS,
        }
    }
}

/// MPR121 capacitive touch controller
///
/// The controller debounces in hardware; this adapter keeps the last
/// electrode status and reports which channels were newly pressed.
pub struct TouchSensor<I2C> {
    i2c: I2C,
    address: u8,
    mode: TouchMode,
    touched: u16,
    pressed: u16,
    next_read_ms: u32,
}

impl<I2C> TouchSensor<I2C>
where
    I2C: I2c,
{
    /// Create an adapter for the controller at [`MPR121_ADDRESS`]
    pub const fn new(i2c: I2C, mode: TouchMode) -> Self {
        Self {
            i2c,
            address: MPR121_ADDRESS,
            mode,
            touched: 0,
            pressed: 0,
            next_read_ms: 0,
        }
    }

    /// Use a different I2C address
    pub fn set_address(&mut self, address: u8) -> &mut Self {
        self.address = address;
        self
    }

    /// Reset the controller and enable every electrode
    ///
    /// Thresholds start at [`DEFAULT_TOUCH_THRESHOLD`] and
    /// [`DEFAULT_RELEASE_THRESHOLD`].
    ///
    /// # Errors
    ///
    /// Returns [`SensorError::Bus`] if the controller does not respond.
    pub fn init(&mut self) -> Result<(), SensorError<I2C::Error, Infallible>> {
        self.write_register(reg::SOFT_RESET, reg::RESET_VALUE)?;
        // electrodes must be stopped while thresholds change
        self.write_register(reg::ECR, 0x00)?;
        for channel in 0..TOUCH_CHANNELS as u8 {
            self.write_threshold(channel, DEFAULT_TOUCH_THRESHOLD, DEFAULT_RELEASE_THRESHOLD)?;
        }
        self.write_register(reg::DEBOUNCE, DEBOUNCE_SAMPLES)?;
        self.start()?;
        self.touched = 0;
        self.pressed = 0;
        log::debug!("mpr121 at {:#04x} ready", self.address);
        Ok(())
    }

    /// Program the touch and release thresholds of one electrode
    ///
    /// # Errors
    ///
    /// Returns [`SensorError::InvalidChannel`] for channels past the last
    /// electrode, or [`SensorError::Bus`] on a bus failure.
    pub fn set_threshold(
        &mut self,
        channel: u8,
        touch: u8,
        release: u8,
    ) -> Result<(), SensorError<I2C::Error, Infallible>> {
        if channel as usize >= TOUCH_CHANNELS {
            return Err(SensorError::InvalidChannel { channel });
        }
        self.write_register(reg::ECR, 0x00)?;
        self.write_threshold(channel, touch, release)?;
        self.start()
    }

    /// Bit `n` set while channel `n` is held
    pub const fn touched(&self) -> u16 {
        self.touched
    }

    /// Channels that went from released to held on the last read
    pub const fn pressed(&self) -> u16 {
        self.pressed
    }

    /// Read the electrode status when due and return the held channels
    ///
    /// In [`TouchMode::Interrupt`] the read happens only when `irq` is
    /// set; in [`TouchMode::Poll`] it happens once per interval and `irq`
    /// is ignored. When no read is due the previous status is returned
    /// and [`pressed`](Self::pressed) is cleared.
    ///
    /// # Errors
    ///
    /// Returns [`SensorError::Bus`] on a bus failure.
    pub fn poll(&mut self, now_ms: u32, irq: bool) -> Result<u16, SensorError<I2C::Error, Infallible>> {
        let due = match self.mode {
            TouchMode::Interrupt => irq,
            TouchMode::Poll { interval_ms } => {
                let due = reached(now_ms, self.next_read_ms);
                if due {
                    self.next_read_ms = now_ms.wrapping_add(interval_ms);
                }
                due
            }
        };
        if due {
            self.read()
        } else {
            self.pressed = 0;
            Ok(self.touched)
        }
    }

    /// Read the electrode status now
    ///
    /// # Errors
    ///
    /// Returns [`SensorError::Bus`] on a bus failure.
    pub fn read(&mut self) -> Result<u16, SensorError<I2C::Error, Infallible>> {
        let mut status = [0u8; 2];
        self.i2c
            .write_read(self.address, &[reg::TOUCH_STATUS], &mut status)
            .map_err(SensorError::Bus)?;
        let touched = u16::from_le_bytes(status) & STATUS_MASK;
        self.pressed = touched & !self.touched;
        self.touched = touched;
        log::trace!("touch={:#05x}", touched);
        Ok(touched)
    }

    /// Release the bus
    pub fn release(self) -> I2C {
        self.i2c
    }

    fn start(&mut self) -> Result<(), SensorError<I2C::Error, Infallible>> {
        // baseline tracking on, all electrodes enabled
        self.write_register(reg::ECR, 0x80 | TOUCH_CHANNELS as u8)
    }

    fn write_threshold(
        &mut self,
        channel: u8,
        touch: u8,
        release: u8,
    ) -> Result<(), SensorError<I2C::Error, Infallible>> {
        let touch_reg = reg::ELE0_TOUCH + 2 * channel;
        self.write_register(touch_reg, touch)?;
        self.write_register(touch_reg + 1, release)
    }

    fn write_register(&mut self, register: u8, value: u8) -> Result<(), SensorError<I2C::Error, Infallible>> {
        self.i2c
            .write(self.address, &[register, value])
            .map_err(SensorError::Bus)
    }
}

// ---------------------------------------------------------------------------
// Triggers

/// Distance below which an object counts as near, in centimeters
pub const DEFAULT_NEAR_CM: u16 = 30;
/// Touch channel that advances the mode
pub const NEXT_MODE_CHANNEL: usize = 0;
/// Touch channel that restores the previous mode
pub const RESTORE_MODE_CHANNEL: usize = 1;

const MAX_ACTIONS: usize = 5;

/// Actions produced by one trigger update
#[derive(Clone, Debug)]
pub struct Actions {
    buf: [Option<Action>; MAX_ACTIONS],
    pos: usize,
}

impl Actions {
    const fn empty() -> Self {
        Self {
            buf: [None; MAX_ACTIONS],
            pos: 0,
        }
    }

    fn push(&mut self, action: Action) {
        if let Some(slot) = self.buf.iter_mut().find(|slot| slot.is_none()) {
            *slot = Some(action);
        }
    }
}

impl Iterator for Actions {
    type Item = Action;

    fn next(&mut self) -> Option<Self::Item> {
        while self.pos < MAX_ACTIONS {
            let action = self.buf[self.pos].take();
            self.pos += 1;
            if action.is_some() {
                return action;
            }
        }
        None
    }
}

/// Turns sensor edges into mode actions
///
/// The first snapshot only sets the baseline; actions come from changes
/// against the previous snapshot.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Triggers {
    near_cm: u16,
    last: Option<SensorSnapshot>,
}

impl Default for Triggers {
    fn default() -> Self {
        Self::new()
    }
}

impl Triggers {
    /// Create a trigger map with [`DEFAULT_NEAR_CM`]
    pub const fn new() -> Self {
        Self {
            near_cm: DEFAULT_NEAR_CM,
            last: None,
        }
    }

    /// Set the near-zone distance
    pub fn set_near_cm(&mut self, near_cm: u16) -> &mut Self {
        self.near_cm = near_cm;
        self
    }

    /// Whether a distance is inside the near zone
    pub const fn is_near(&self, range_cm: u16) -> bool {
        range_cm != 0 && range_cm < self.near_cm
    }

    /// Compare against the previous snapshot and report what to do
    pub fn update(&mut self, snapshot: &SensorSnapshot) -> Actions {
        let mut actions = Actions::empty();
        let Some(last) = self.last.replace(*snapshot) else {
            return actions;
        };

        let pressed = snapshot.touched & !last.touched;
        if pressed & (1 << NEXT_MODE_CHANNEL) != 0 {
            actions.push(Action::NextMode);
        }
        if pressed & (1 << RESTORE_MODE_CHANNEL) != 0 {
            actions.push(Action::RestoreMode);
        }

        match (self.is_near(last.range_cm), self.is_near(snapshot.range_cm)) {
            (false, true) => actions.push(Action::NextFollowup),
            (true, false) => actions.push(Action::RestoreFollowup),
            _ => {}
        }

        if snapshot.dark && !last.dark {
            actions.push(Action::NextMode);
        }
        actions
    }
}
