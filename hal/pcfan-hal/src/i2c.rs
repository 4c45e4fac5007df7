//! `embedded-hal` I2C adapter
//!
//! Maps the begin/write/end transaction model onto the whole-transfer
//! calls of [`embedded_hal::i2c::I2c`]. Queued bytes are held in a fixed
//! buffer and sent as one `write` when the transaction is closed, so the
//! peripheral sees a single START..STOP sequence per transaction.
//!
//! An empty transaction (a presence check) is sent as a one-byte read
//! rather than a zero-length write, since some I2C peripherals refuse
//! zero-length buffers.

use embedded_hal::i2c::{Error as _, ErrorKind, I2c};
use heapless::Vec;

use crate::bus::BusTransport;

/// Largest transfer the adapter buffers in either direction
pub const MAX_TRANSFER: usize = 32;

/// Error from the I2C adapter
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum BusError<E> {
    /// Error reported by the underlying I2C peripheral
    I2c(E),
    /// More than [`MAX_TRANSFER`] bytes queued in one transaction
    BufferFull,
    /// Read request larger than [`MAX_TRANSFER`]
    RequestTooLarge,
}

impl<E: embedded_hal::i2c::Error> BusError<E> {
    /// Classify the error in `embedded-hal` terms
    pub fn kind(&self) -> ErrorKind {
        match self {
            BusError::I2c(e) => e.kind(),
            BusError::BufferFull | BusError::RequestTooLarge => ErrorKind::Other,
        }
    }

    /// True if the device did not acknowledge
    pub fn is_nack(&self) -> bool {
        matches!(self.kind(), ErrorKind::NoAcknowledge(_))
    }
}

/// [`BusTransport`] over any blocking `embedded-hal` I2C bus
///
/// Pass a shared-bus device (e.g. from `embedded-hal-bus`) to put several
/// peripherals on the same wires.
pub struct I2cTransport<I2C> {
    i2c: I2C,
    target: u8,
    tx: Vec<u8, MAX_TRANSFER>,
    rx: Vec<u8, MAX_TRANSFER>,
    rx_pos: usize,
}

impl<I2C: I2c> I2cTransport<I2C> {
    /// Wrap an I2C bus
    pub fn new(i2c: I2C) -> Self {
        Self {
            i2c,
            target: 0,
            tx: Vec::new(),
            rx: Vec::new(),
            rx_pos: 0,
        }
    }

    /// Give back the wrapped bus
    pub fn release(self) -> I2C {
        self.i2c
    }
}

impl<I2C: I2c> BusTransport for I2cTransport<I2C> {
    type Error = BusError<I2C::Error>;

    fn init(&mut self) -> Result<(), Self::Error> {
        // Clock and pins are owned by the HAL that built `I2C`
        self.tx.clear();
        self.rx.clear();
        self.rx_pos = 0;
        Ok(())
    }

    fn begin_transaction(&mut self, address: u8) {
        self.target = address;
        self.tx.clear();
    }

    fn write_byte(&mut self, byte: u8) -> Result<(), Self::Error> {
        self.tx.push(byte).map_err(|_| BusError::BufferFull)
    }

    fn end_transaction(&mut self) -> Result<(), Self::Error> {
        let result = if self.tx.is_empty() {
            // Address-only presence check; the byte read back is discarded
            self.i2c.read(self.target, &mut [0u8])
        } else {
            self.i2c.write(self.target, &self.tx)
        };
        self.tx.clear();
        result.map_err(BusError::I2c)
    }

    fn request_bytes(&mut self, address: u8, count: usize) -> Result<usize, Self::Error> {
        if count > MAX_TRANSFER {
            return Err(BusError::RequestTooLarge);
        }
        self.rx.clear();
        self.rx_pos = 0;
        // Length is checked above, resize cannot fail
        let _ = self.rx.resize(count, 0);
        if let Err(e) = self.i2c.read(address, &mut self.rx) {
            self.rx.clear();
            return Err(BusError::I2c(e));
        }
        Ok(count)
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
    use embedded_hal::i2c::{ErrorType, NoAcknowledgeSource, Operation};

    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    struct Nack;

    impl embedded_hal::i2c::Error for Nack {
        fn kind(&self) -> ErrorKind {
            ErrorKind::NoAcknowledge(NoAcknowledgeSource::Address)
        }
    }

    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    enum StrictError {
        Nack,
        EmptyWrite,
    }

    impl embedded_hal::i2c::Error for StrictError {
        fn kind(&self) -> ErrorKind {
            match self {
                StrictError::Nack => ErrorKind::NoAcknowledge(NoAcknowledgeSource::Address),
                StrictError::EmptyWrite => ErrorKind::Other,
            }
        }
    }

    /// Records writes and answers reads from a fixed pattern
    struct FakeI2c {
        present: u8,
        writes: std::vec::Vec<(u8, std::vec::Vec<u8>)>,
        reads: usize,
        response: [u8; 4],
    }

    /// Rejects zero-length writes the way some HALs do
    struct StrictI2c {
        present: u8,
    }

    impl ErrorType for StrictI2c {
        type Error = StrictError;
    }

    impl I2c for StrictI2c {
        fn transaction(
            &mut self,
            address: u8,
            operations: &mut [Operation<'_>],
        ) -> Result<(), Self::Error> {
            for op in operations.iter() {
                if let Operation::Write(data) = op {
                    if data.is_empty() {
                        return Err(StrictError::EmptyWrite);
                    }
                }
            }
            if address != self.present {
                return Err(StrictError::Nack);
            }
            Ok(())
        }
    }

    impl ErrorType for FakeI2c {
        type Error = Nack;
    }

    impl I2c for FakeI2c {
        fn transaction(
            &mut self,
            address: u8,
            operations: &mut [Operation<'_>],
        ) -> Result<(), Self::Error> {
            if address != self.present {
                return Err(Nack);
            }
            for op in operations {
                match op {
                    Operation::Write(data) => self.writes.push((address, data.to_vec())),
                    Operation::Read(buf) => {
                        self.reads += 1;
                        for (slot, byte) in buf.iter_mut().zip(self.response.iter().cycle()) {
                            *slot = *byte;
                        }
                    }
                }
            }
            Ok(())
        }
    }

    fn fake() -> FakeI2c {
        FakeI2c {
            present: 0x36,
            writes: std::vec::Vec::new(),
            reads: 0,
            response: [0x09, 0x60, 0xAB, 0xCD],
        }
    }

    #[test]
    fn test_transaction_sent_as_one_write() {
        let mut bus = I2cTransport::new(fake());
        bus.begin_transaction(0x36);
        bus.write_byte(0x04).unwrap();
        bus.write_byte(0x01).unwrap();
        bus.write_byte(0x2C).unwrap();
        bus.end_transaction().unwrap();

        let i2c = bus.release();
        assert_eq!(i2c.writes.len(), 1);
        assert_eq!(i2c.writes[0], (0x36, std::vec![0x04, 0x01, 0x2C]));
    }

    #[test]
    fn test_empty_transaction_is_one_byte_read() {
        let mut bus = I2cTransport::new(fake());
        assert!(bus.write(0x36, &[]).is_ok());

        let err = bus.write(0x40, &[]).unwrap_err();
        assert!(err.is_nack());

        let i2c = bus.release();
        assert!(i2c.writes.is_empty());
        assert_eq!(i2c.reads, 1);
    }

    #[test]
    fn test_presence_check_without_empty_writes() {
        let mut bus = I2cTransport::new(StrictI2c { present: 0x36 });
        assert_eq!(bus.write(0x36, &[]), Ok(()));
        assert!(bus.write(0x40, &[]).unwrap_err().is_nack());
    }

    #[test]
    fn test_read_drains_in_order() {
        let mut bus = I2cTransport::new(fake());
        assert_eq!(bus.request_bytes(0x36, 2).unwrap(), 2);
        assert_eq!(bus.read_byte(), Some(0x09));
        assert_eq!(bus.read_byte(), Some(0x60));
        assert_eq!(bus.read_byte(), None);
    }

    #[test]
    fn test_failed_read_leaves_nothing() {
        let mut bus = I2cTransport::new(fake());
        assert!(bus.request_bytes(0x22, 2).is_err());
        assert_eq!(bus.read_byte(), None);
    }

    #[test]
    fn test_limits() {
        let mut bus = I2cTransport::new(fake());
        assert_eq!(
            bus.request_bytes(0x36, MAX_TRANSFER + 1),
            Err(BusError::RequestTooLarge)
        );

        bus.begin_transaction(0x36);
        for _ in 0..MAX_TRANSFER {
            bus.write_byte(0).unwrap();
        }
        assert_eq!(bus.write_byte(0), Err(BusError::BufferFull));
        assert_eq!(BusError::<Nack>::BufferFull.kind(), ErrorKind::Other);
    }
}
