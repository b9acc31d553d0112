//! Test doubles shared across the stack's test modules.

use std::collections::VecDeque;
use std::fmt::Write;
use std::string::String;
use std::vec::Vec;

use lark_driver_traits::{Console, Delay, MacAddr, NetResult, NicDevice};

/// NIC double that records transmitted frames and serves frames
/// queued on `rx_queue`.
pub(crate) struct MockNic {
    pub(crate) mac: MacAddr,
    pub(crate) link: bool,
    pub(crate) sent: Vec<Vec<u8>>,
    pub(crate) rx_queue: VecDeque<Vec<u8>>,
    pub(crate) acks: usize,
}

impl MockNic {
    pub(crate) fn new() -> MockNic {
        MockNic {
            mac: MacAddr([0x52, 0x54, 0x00, 0x12, 0x34, 0x56]),
            link: true,
            sent: Vec::new(),
            rx_queue: VecDeque::new(),
            acks: 0,
        }
    }
}

impl NicDevice for MockNic {
    fn mac_address(&self) -> MacAddr {
        self.mac
    }

    fn send_frame(&mut self, frame: &[u8]) -> NetResult<()> {
        self.sent.push(frame.to_vec());
        Ok(())
    }

    fn receive_frame(&mut self, buf: &mut [u8]) -> NetResult<Option<usize>> {
        match self.rx_queue.pop_front() {
            Some(frame) => {
                let len = frame.len().min(buf.len());
                buf[..len].copy_from_slice(&frame[..len]);
                Ok(Some(len))
            }
            None => Ok(None),
        }
    }

    fn link_up(&self) -> bool {
        self.link
    }

    fn interrupt_line(&self) -> u8 {
        11
    }

    fn ack_interrupt(&mut self) {
        self.acks += 1;
    }
}

/// Console that collects written lines for assertions.
pub(crate) struct LogSink {
    pub(crate) lines: Vec<String>,
}

impl LogSink {
    pub(crate) fn new() -> LogSink {
        LogSink { lines: Vec::new() }
    }
}

impl Console for LogSink {
    fn write_line(&mut self, args: core::fmt::Arguments<'_>) {
        let mut line = String::new();
        let _ = line.write_fmt(args);
        self.lines.push(line);
    }
}

pub(crate) struct NoDelay;

impl Delay for NoDelay {
    fn delay_ms(&self, _ms: u64) {}
}
