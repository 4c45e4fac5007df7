//! Simulated fan controller for host tests
//!
//! [`SimulatedFan`] behaves like the peripheral on the wire: it acknowledges
//! only its own address, keeps a register pointer set by the first byte of
//! each write, auto-increments the pointer across payload bytes and reads,
//! and moves to a new bus address when the address register is written.
//! Every transaction is logged so tests can assert on exact bus traffic.

use heapless::Vec;

use crate::bus::BusTransport;

/// Number of registers the simulated device exposes (0x00..=0x10)
pub const REGISTER_COUNT: usize = 0x11;

/// Largest single write (register pointer plus payload)
pub const MAX_WRITE: usize = 8;

/// Transactions kept in the log; older entries are dropped first
pub const LOG_CAPACITY: usize = 64;

/// Register holding the device's own bus address
const ADDRESS_REGISTER: u8 = 0x00;

/// Simulated bus failure
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum MockError {
    /// Device did not acknowledge
    Nack,
    /// Write longer than [`MAX_WRITE`]
    Overflow,
}

/// What a logged transaction did
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Op {
    /// Write transaction with its bytes (empty for a probe)
    Write(Vec<u8, MAX_WRITE>),
    /// Read request for this many bytes
    Read(usize),
}

impl Op {
    /// Build a write op from a slice, truncated to [`MAX_WRITE`]
    pub fn write(data: &[u8]) -> Self {
        let mut bytes = Vec::new();
        for &b in data.iter().take(MAX_WRITE) {
            let _ = bytes.push(b);
        }
        Op::Write(bytes)
    }
}

/// One logged bus transaction
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transaction {
    /// Address the transaction was sent to
    pub address: u8,
    /// Operation performed
    pub op: Op,
    /// Whether the device acknowledged
    pub acked: bool,
}

/// In-memory fan controller implementing [`BusTransport`]
#[derive(Debug, Clone)]
pub struct SimulatedFan {
    address: u8,
    registers: [u8; REGISTER_COUNT],
    pointer: u8,
    target: u8,
    pending: Vec<u8, MAX_WRITE>,
    overflowed: bool,
    rx: Vec<u8, MAX_WRITE>,
    rx_pos: usize,
    log: Vec<Transaction, LOG_CAPACITY>,
    seen: usize,
    nack_at: Option<usize>,
    init_count: u32,
}

impl SimulatedFan {
    /// Create a device answering at `address` with all registers zero
    pub fn new(address: u8) -> Self {
        let mut registers = [0u8; REGISTER_COUNT];
        registers[ADDRESS_REGISTER as usize] = address;
        Self {
            address,
            registers,
            pointer: 0,
            target: 0,
            pending: Vec::new(),
            overflowed: false,
            rx: Vec::new(),
            rx_pos: 0,
            log: Vec::new(),
            seen: 0,
            nack_at: None,
            init_count: 0,
        }
    }

    /// Address the device currently answers at
    pub fn address(&self) -> u8 {
        self.address
    }

    /// Raw register value
    pub fn register(&self, reg: u8) -> u8 {
        self.registers.get(reg as usize).copied().unwrap_or(0)
    }

    /// Big-endian 16-bit value starting at `reg`
    pub fn register_u16(&self, reg: u8) -> u16 {
        u16::from_be_bytes([self.register(reg), self.register(reg.wrapping_add(1))])
    }

    /// Preload a register
    pub fn set_register(&mut self, reg: u8, value: u8) {
        if let Some(slot) = self.registers.get_mut(reg as usize) {
            *slot = value;
        }
    }

    /// Preload a big-endian 16-bit value starting at `reg`
    pub fn set_register_u16(&mut self, reg: u8, value: u16) {
        let [hi, lo] = value.to_be_bytes();
        self.set_register(reg, hi);
        self.set_register(reg.wrapping_add(1), lo);
    }

    /// Refuse to acknowledge the `n`-th transaction from now (0 = next)
    pub fn nack_transaction(&mut self, n: usize) {
        self.nack_at = Some(self.seen + n);
    }

    /// The most recent transactions, oldest first
    pub fn transactions(&self) -> &[Transaction] {
        &self.log
    }

    /// Forget the transaction log
    pub fn clear_log(&mut self) {
        self.log.clear();
        self.nack_at = None;
    }

    /// Number of times the bus was initialised
    pub fn init_count(&self) -> u32 {
        self.init_count
    }

    /// Log a transaction and decide whether it is acknowledged
    fn record(&mut self, address: u8, op: Op) -> bool {
        let index = self.seen;
        self.seen += 1;
        let acked = address == self.address && self.nack_at != Some(index);
        if self.log.is_full() {
            self.log.remove(0);
        }
        let _ = self.log.push(Transaction { address, op, acked });
        acked
    }

    fn apply_write(&mut self) {
        let Some((&pointer, payload)) = self.pending.split_first() else {
            return;
        };
        let mut reg = pointer;
        let mut new_address = None;
        for &byte in payload {
            if reg == ADDRESS_REGISTER {
                new_address = Some(byte);
            }
            if let Some(slot) = self.registers.get_mut(reg as usize) {
                *slot = byte;
            }
            reg = reg.wrapping_add(1);
        }
        self.pointer = pointer;
        if let Some(address) = new_address {
            self.address = address;
        }
    }
}

impl BusTransport for SimulatedFan {
    type Error = MockError;

    fn init(&mut self) -> Result<(), Self::Error> {
        self.init_count += 1;
        Ok(())
    }

    fn begin_transaction(&mut self, address: u8) {
        self.target = address;
        self.pending.clear();
        self.overflowed = false;
    }

    fn write_byte(&mut self, byte: u8) -> Result<(), Self::Error> {
        if self.pending.push(byte).is_err() {
            self.overflowed = true;
            return Err(MockError::Overflow);
        }
        Ok(())
    }

    fn end_transaction(&mut self) -> Result<(), Self::Error> {
        if self.overflowed {
            return Err(MockError::Overflow);
        }
        let op = Op::Write(self.pending.clone());
        if !self.record(self.target, op) {
            self.pending.clear();
            return Err(MockError::Nack);
        }
        self.apply_write();
        self.pending.clear();
        Ok(())
    }

    fn request_bytes(&mut self, address: u8, count: usize) -> Result<usize, Self::Error> {
        self.rx.clear();
        self.rx_pos = 0;
        if !self.record(address, Op::Read(count)) {
            return Err(MockError::Nack);
        }
        let mut reg = self.pointer;
        for _ in 0..count.min(MAX_WRITE) {
            let value = self.register(reg);
            let _ = self.rx.push(value);
            reg = reg.wrapping_add(1);
        }
        self.pointer = reg;
        Ok(self.rx.len())
    }

    fn read_byte(&mut self) -> Option<u8> {
        let byte = self.rx.get(self.rx_pos).copied()?;
        self.rx_pos += 1;
        Some(byte)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pointer_and_autoincrement() {
        let mut dev = SimulatedFan::new(0x36);
        dev.write(0x36, &[0x04, 0x01, 0x2C, 0xFF, 0x9C]).unwrap();

        assert_eq!(dev.register_u16(0x04), 0x012C);
        assert_eq!(dev.register_u16(0x06), 0xFF9C);
    }

    #[test]
    fn test_address_register_moves_device() {
        let mut dev = SimulatedFan::new(0x36);
        dev.write(0x36, &[0x00, 0x42]).unwrap();

        assert_eq!(dev.address(), 0x42);
        assert!(dev.write(0x36, &[]).is_err());
        assert!(dev.write(0x42, &[]).is_ok());
    }

    #[test]
    fn test_scheduled_nack_is_logged() {
        let mut dev = SimulatedFan::new(0x36);
        dev.nack_transaction(1);

        assert!(dev.write(0x36, &[0x0D, 0x00]).is_ok());
        assert_eq!(dev.write(0x36, &[0x02, 0x04, 0xB0]), Err(MockError::Nack));
        assert!(dev.write(0x36, &[]).is_ok());

        let acked: std::vec::Vec<bool> = dev.transactions().iter().map(|t| t.acked).collect();
        assert_eq!(acked, [true, false, true]);
        // Nacked write must not land in the register file
        assert_eq!(dev.register_u16(0x02), 0);
    }

    #[test]
    fn test_full_log_keeps_latest_and_nacks_once() {
        let mut dev = SimulatedFan::new(0x36);
        for _ in 0..LOG_CAPACITY {
            dev.write(0x36, &[]).unwrap();
        }

        dev.nack_transaction(0);
        assert_eq!(dev.write(0x36, &[0x0D, 0xFF]), Err(MockError::Nack));
        assert!(dev.write(0x36, &[0x0D, 0x00]).is_ok());

        let log = dev.transactions();
        assert_eq!(log.len(), LOG_CAPACITY);
        let last = &log[LOG_CAPACITY - 1];
        assert_eq!(last.op, Op::write(&[0x0D, 0x00]));
        assert!(last.acked);
        assert!(!log[LOG_CAPACITY - 2].acked);
    }

    #[test]
    fn test_overflowing_write_rejected() {
        let mut dev = SimulatedFan::new(0x36);
        let data = [0u8; MAX_WRITE + 1];
        assert_eq!(dev.write(0x36, &data), Err(MockError::Overflow));
        assert!(dev.transactions().is_empty());
    }
}
