//! PI fan controller driver
//!
//! Works with both the fan controller board and the blower board; they run
//! the same firmware. Functions marked "controller board only" touch
//! hardware the blower does not have and are not guarded.
//!
//! # Transaction shape
//!
//! Every access starts by writing the register address:
//!
//! - Write: `[reg, payload...]` in one transaction
//! - Read: `[reg]` in one transaction, then a separate read of the
//!   register width, MSB first
//!
//! A missing acknowledge fails the call immediately. There is no retry.
//!
//! # Control modes
//!
//! The firmware only honours the RPM setpoint while its PI loop is enabled
//! and only honours percent throttle while the loop is disabled. The driver
//! caches the loop state (see [`PiMode`]) and flips it before writing
//! whichever input the caller used. The cache starts out enabled, matching
//! the power-on default, and is only refreshed from the controller by
//! [`PcFan::read_pi_mode`].

use pcfan_core::codec::{
    decode_gain_bytes, decode_trim_scale, decode_u16, encode_gains, encode_trim_scale,
    encode_u16,
};
use pcfan_core::{
    validate_address, ControlInput, FanConfig, FanStatus, PiGains, PiMode, Register, Switch,
    DEFAULT_ADDRESS,
};
use pcfan_hal::BusTransport;

use crate::error::Error;

/// Driver for one fan controller on a two-wire bus
pub struct PcFan<B> {
    bus: B,
    address: u8,
    mode: PiMode,
    ready: bool,
}

impl<B: BusTransport> PcFan<B> {
    /// Create an unbound driver
    ///
    /// Nothing is sent until [`begin`](Self::begin).
    pub fn new(bus: B) -> Self {
        Self {
            bus,
            address: DEFAULT_ADDRESS,
            mode: PiMode::default(),
            ready: false,
        }
    }

    // Connection management

    /// Bind to `address`, bring the bus up and probe for the controller
    ///
    /// The transport is initialised unconditionally, which may undo any
    /// clock setting made on it earlier.
    pub fn begin(&mut self, address: u8) -> Result<(), Error<B::Error>> {
        let address = validate_address(address).map_err(Error::invalid_address)?;
        self.address = address;
        self.ready = false;

        self.bus.init()?;

        if !self.is_connected() {
            warn!("No fan controller at {=u8:#x}", address);
            return Err(Error::NotConnected);
        }

        self.ready = true;
        info!("Fan controller ready at {=u8:#x}", address);
        Ok(())
    }

    /// [`begin`](Self::begin) at the factory default address
    pub fn begin_default(&mut self) -> Result<(), Error<B::Error>> {
        self.begin(DEFAULT_ADDRESS)
    }

    /// [`begin`](Self::begin) at the configured address, then
    /// [`apply_config`](Self::apply_config)
    ///
    /// An invalid configuration is rejected before anything is sent.
    pub fn begin_with_config(&mut self, config: &FanConfig) -> Result<(), Error<B::Error>> {
        config.validate().map_err(Error::invalid_address)?;
        self.begin(config.address)?;
        self.apply_config(config)
    }

    /// Check whether the controller acknowledges its address
    ///
    /// Sends an empty transaction; no register is touched.
    pub fn is_connected(&mut self) -> bool {
        self.bus.write(self.address, &[]).is_ok()
    }

    /// Move the controller to a new bus address
    ///
    /// `new_address` must be in 8..=119; otherwise nothing is sent. After
    /// the controller acknowledges the change the driver rebinds and probes
    /// again. If that probe fails the driver stays bound to the new address
    /// but is no longer ready.
    pub fn set_i2c_address(&mut self, new_address: u8) -> Result<(), Error<B::Error>> {
        let new_address = validate_address(new_address).map_err(Error::invalid_address)?;

        self.write_register(Register::Address, &[new_address])?;
        debug!(
            "Controller moved from {=u8:#x} to {=u8:#x}",
            self.address, new_address
        );

        self.begin(new_address)
    }

    /// Address the driver is bound to
    pub fn address(&self) -> u8 {
        self.address
    }

    /// Check whether `begin` has succeeded
    pub fn is_ready(&self) -> bool {
        self.ready
    }

    /// Cached PI loop mode
    pub fn pi_mode(&self) -> PiMode {
        self.mode
    }

    /// Borrow the transport
    pub fn bus(&self) -> &B {
        &self.bus
    }

    /// Mutably borrow the transport, e.g. to change the bus clock
    pub fn bus_mut(&mut self) -> &mut B {
        &mut self.bus
    }

    /// Give back the transport
    pub fn release(self) -> B {
        self.bus
    }

    // Speed control

    /// Set the PI setpoint in RPM
    ///
    /// Enables the PI loop first if it is disabled. If enabling fails the
    /// setpoint is not written.
    pub fn set_fan_speed(&mut self, rpm: u16) -> Result<(), Error<B::Error>> {
        self.ensure_ready()?;
        self.arbitrate(ControlInput::Setpoint)?;
        self.write_register(Register::SetpointRpm, &encode_u16(rpm))
    }

    /// Current PI setpoint in RPM
    pub fn get_setpoint(&mut self) -> Result<u16, Error<B::Error>> {
        self.read_u16(Register::SetpointRpm)
    }

    /// Fan speed measured by the tachometer, in RPM
    pub fn get_fan_speed(&mut self) -> Result<u16, Error<B::Error>> {
        self.read_u16(Register::ActualRpm)
    }

    /// Set the fan speed as a percentage of full speed
    ///
    /// Disables the PI loop first if it is enabled. If disabling fails the
    /// throttle is not written. Values are sent unscaled; the firmware uses
    /// 0-100.
    pub fn set_percent_throttle(&mut self, throttle: u8) -> Result<(), Error<B::Error>> {
        self.ensure_ready()?;
        if throttle > 100 {
            warn!("Throttle {=u8} above 100%", throttle);
        }
        self.arbitrate(ControlInput::Throttle)?;
        self.write_register(Register::PercentThrottle, &[throttle])
    }

    /// Current fan speed as a percentage of full speed
    ///
    /// With the PI loop enabled this follows the PI output.
    pub fn get_percent_throttle(&mut self) -> Result<u8, Error<B::Error>> {
        self.read_u8(Register::PercentThrottle)
    }

    /// Last PI controller output (20-320)
    pub fn get_pi_out(&mut self) -> Result<u16, Error<B::Error>> {
        self.read_u16(Register::PiOut)
    }

    /// Set tachometer pulses per rotation (usually 2)
    pub fn set_tach_divider(&mut self, divider: u8) -> Result<(), Error<B::Error>> {
        self.write_register(Register::TachDivider, &[divider])
    }

    // PI loop

    /// Set Kp and Ki in one transaction
    ///
    /// Each gain is clamped to -327.68..=327.67 and sent as a ×100 fixed
    /// point value truncated toward zero. Writing gains overrides the
    /// onboard trimpots.
    pub fn set_pi_gain(&mut self, kp: f32, ki: f32) -> Result<(), Error<B::Error>> {
        self.write_register(Register::Kp, &encode_gains(kp, ki))
    }

    /// Current proportional gain
    pub fn get_p_gain(&mut self) -> Result<f32, Error<B::Error>> {
        let bytes = self.read_register::<2>(Register::Kp)?;
        Ok(decode_gain_bytes(bytes))
    }

    /// Current integral gain
    pub fn get_i_gain(&mut self) -> Result<f32, Error<B::Error>> {
        let bytes = self.read_register::<2>(Register::Ki)?;
        Ok(decode_gain_bytes(bytes))
    }

    /// Both gains, read one register at a time
    pub fn get_pi_gains(&mut self) -> Result<PiGains, Error<B::Error>> {
        let kp = self.get_p_gain()?;
        let ki = self.get_i_gain()?;
        Ok(PiGains::new(kp, ki))
    }

    /// Disable the PI loop; the fan follows percent throttle
    pub fn disable_pi(&mut self) -> Result<(), Error<B::Error>> {
        self.enter_mode(PiMode::Disabled)
    }

    /// Enable the PI loop; the fan follows the RPM setpoint
    pub fn enable_pi(&mut self) -> Result<(), Error<B::Error>> {
        self.enter_mode(PiMode::Enabled)
    }

    /// Read the PI loop state from the controller and refresh the cache
    pub fn read_pi_mode(&mut self) -> Result<PiMode, Error<B::Error>> {
        let mode = PiMode::from_register(self.read_u8(Register::PiDisable)?);
        if mode != self.mode {
            debug!("PI loop cache was {}, controller reports {}", self.mode, mode);
        }
        self.mode = mode;
        Ok(mode)
    }

    // Controller board only

    /// Cut power to the fan (controller board only)
    pub fn disable_fan(&mut self) -> Result<(), Error<B::Error>> {
        self.write_switch(Register::FanEnable, Switch::Off)
    }

    /// Restore power to the fan (controller board only)
    pub fn enable_fan(&mut self) -> Result<(), Error<B::Error>> {
        self.write_switch(Register::FanEnable, Switch::On)
    }

    /// Trimpot multiplier, -12.8 to 12.7 (controller board only)
    pub fn get_trimmer_scale(&mut self) -> Result<f32, Error<B::Error>> {
        let raw = self.read_u8(Register::TrimmerScale)?;
        Ok(decode_trim_scale(raw))
    }

    /// Set the trimpot multiplier (controller board only)
    ///
    /// Clamped to -12.8..=12.7 and sent as a ×10 signed byte.
    pub fn set_trimmer_scale(&mut self, scale: f32) -> Result<(), Error<B::Error>> {
        let raw = encode_trim_scale(scale);
        self.write_register(Register::TrimmerScale, &[raw as u8])
    }

    /// Ignore the trimpots and use register gains only (controller board only)
    pub fn disable_trimmer(&mut self) -> Result<(), Error<B::Error>> {
        self.write_switch(Register::TrimmerDisable, Switch::Off)
    }

    /// Read gains from the trimpots again (controller board only)
    pub fn enable_trimmer(&mut self) -> Result<(), Error<B::Error>> {
        self.write_switch(Register::TrimmerDisable, Switch::On)
    }

    // Aggregates

    /// Read the speed registers in one go
    pub fn read_status(&mut self) -> Result<FanStatus, Error<B::Error>> {
        Ok(FanStatus {
            setpoint_rpm: self.get_setpoint()?,
            actual_rpm: self.get_fan_speed()?,
            pi_out: self.get_pi_out()?,
            percent_throttle: self.get_percent_throttle()?,
            pi_mode: self.mode,
        })
    }

    /// Write every setting present in `config`
    ///
    /// Settings are written in register order and the first failure stops
    /// the sequence; earlier writes stay in effect. The address field is not
    /// touched here.
    pub fn apply_config(&mut self, config: &FanConfig) -> Result<(), Error<B::Error>> {
        self.ensure_ready()?;
        if !config.has_settings() {
            return Ok(());
        }

        if let Some(gains) = config.gains {
            self.set_pi_gain(gains.kp, gains.ki)?;
        }
        if let Some(divider) = config.tach_divider {
            self.set_tach_divider(divider)?;
        }
        if let Some(scale) = config.trimmer_scale {
            self.set_trimmer_scale(scale)?;
        }
        if let Some(enabled) = config.trimmer_enabled {
            self.write_switch(Register::TrimmerDisable, Switch::from(enabled))?;
        }

        Ok(())
    }

    // Mode arbitration

    /// Switch the PI loop so that `input` takes effect
    fn arbitrate(&mut self, input: ControlInput) -> Result<(), Error<B::Error>> {
        if let Some(target) = self.mode.transition_for(input) {
            debug!("Switching PI loop to {} for {}", target, input);
            self.enter_mode(target)?;
        }
        Ok(())
    }

    /// Write the PI-disable register; the cache follows only on ack
    fn enter_mode(&mut self, mode: PiMode) -> Result<(), Error<B::Error>> {
        self.write_register(Register::PiDisable, &[mode.register_value()])?;
        self.mode = mode;
        Ok(())
    }

    // Register primitives

    fn ensure_ready(&self) -> Result<(), Error<B::Error>> {
        if self.ready {
            Ok(())
        } else {
            Err(Error::NotReady)
        }
    }

    fn write_switch(&mut self, register: Register, switch: Switch) -> Result<(), Error<B::Error>> {
        self.write_register(register, &[switch.register_value()])
    }

    fn write_register(
        &mut self,
        register: Register,
        payload: &[u8],
    ) -> Result<(), Error<B::Error>> {
        self.ensure_ready()?;
        trace!("Write {} {=[u8]:#x}", register, payload);
        if register.controller_only() {
            trace!("{} has no effect on the blower board", register);
        }

        self.bus.begin_transaction(self.address);
        self.bus.write_byte(register.addr())?;
        for &byte in payload {
            self.bus.write_byte(byte)?;
        }
        if let Err(e) = self.bus.end_transaction() {
            warn!("Write to {} not acknowledged", register);
            return Err(Error::Bus(e));
        }
        Ok(())
    }

    fn read_register<const N: usize>(
        &mut self,
        register: Register,
    ) -> Result<[u8; N], Error<B::Error>> {
        debug_assert_eq!(N, register.width());
        self.ensure_ready()?;

        // Point at the register, then read it in a second transaction
        if let Err(e) = self.bus.write(self.address, &[register.addr()]) {
            warn!("Select {} not acknowledged", register);
            return Err(Error::Bus(e));
        }

        let mut buf = [0u8; N];
        let received = self.bus.read(self.address, &mut buf)?;
        if received < N {
            warn!("Short read from {}: {=usize} of {=usize}", register, received, N);
            return Err(Error::ShortRead);
        }

        trace!("Read {} {=[u8]:#x}", register, &buf[..]);
        Ok(buf)
    }

    fn read_u8(&mut self, register: Register) -> Result<u8, Error<B::Error>> {
        let [byte] = self.read_register::<1>(register)?;
        Ok(byte)
    }

    fn read_u16(&mut self, register: Register) -> Result<u16, Error<B::Error>> {
        let bytes = self.read_register::<2>(register)?;
        Ok(decode_u16(bytes))
    }
}
