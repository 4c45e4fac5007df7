//! Two-wire bus transport
//!
//! The transaction model follows the controller-side view of the bus:
//! a write transaction is opened for a device, filled byte by byte and then
//! closed, at which point the device either acknowledges or not. Reads are a
//! separate request for a fixed number of bytes that are then drained one at
//! a time.

/// Blocking two-wire bus master
///
/// Every method blocks until the transport has finished. The driver assumes
/// nothing else uses the bus between `begin_transaction` and
/// `end_transaction`; sharing a physical bus is the implementor's concern.
pub trait BusTransport {
    /// Error type for bus operations
    type Error;

    /// Bring the bus up
    ///
    /// Called on every driver `begin`. Implementations may reset any clock
    /// configuration applied earlier.
    fn init(&mut self) -> Result<(), Self::Error>;

    /// Open a write transaction to a device
    ///
    /// Discards any transaction that was opened but never ended.
    ///
    /// # Arguments
    /// * `address` - 7-bit device address
    fn begin_transaction(&mut self, address: u8);

    /// Queue one byte into the open transaction
    fn write_byte(&mut self, byte: u8) -> Result<(), Self::Error>;

    /// Close the open transaction
    ///
    /// Returns `Ok` only if the device acknowledged. A transaction with no
    /// queued bytes is a pure presence probe.
    fn end_transaction(&mut self) -> Result<(), Self::Error>;

    /// Request `count` bytes from a device
    ///
    /// Returns how many bytes were received and are available from
    /// [`read_byte`](Self::read_byte).
    fn request_bytes(&mut self, address: u8, count: usize) -> Result<usize, Self::Error>;

    /// Take the next received byte, or `None` once drained
    fn read_byte(&mut self) -> Option<u8>;

    /// Write `data` to a device as one transaction
    fn write(&mut self, address: u8, data: &[u8]) -> Result<(), Self::Error> {
        self.begin_transaction(address);
        for &byte in data {
            self.write_byte(byte)?;
        }
        self.end_transaction()
    }

    /// Read into `buf` as one transaction
    ///
    /// Returns the number of bytes actually stored, which may be short if
    /// the device delivered fewer than requested.
    fn read(&mut self, address: u8, buf: &mut [u8]) -> Result<usize, Self::Error> {
        let available = self.request_bytes(address, buf.len())?;
        let mut filled = 0;
        for slot in buf.iter_mut().take(available) {
            match self.read_byte() {
                Some(byte) => {
                    *slot = byte;
                    filled += 1;
                }
                None => break,
            }
        }
        Ok(filled)
    }
}

impl<T: BusTransport + ?Sized> BusTransport for &mut T {
    type Error = T::Error;

    fn init(&mut self) -> Result<(), Self::Error> {
        T::init(self)
    }

    fn begin_transaction(&mut self, address: u8) {
        T::begin_transaction(self, address)
    }

    fn write_byte(&mut self, byte: u8) -> Result<(), Self::Error> {
        T::write_byte(self, byte)
    }

    fn end_transaction(&mut self) -> Result<(), Self::Error> {
        T::end_transaction(self)
    }

    fn request_bytes(&mut self, address: u8, count: usize) -> Result<usize, Self::Error> {
        T::request_bytes(self, address, count)
    }

    fn read_byte(&mut self) -> Option<u8> {
        T::read_byte(self)
    }
}
