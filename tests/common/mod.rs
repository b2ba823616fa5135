use std::sync::{LazyLock, Mutex};

use dynamic_connectivity::lists::AggregatedData;
use flexi_logger::{Logger, LoggerHandle};

pub mod slow_lists;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AggSum(pub i32);

impl AggregatedData for AggSum {
    type Data = i32;

    fn from(data: &Self::Data) -> Self {
        Self(*data)
    }

    fn merge(self, right: Self) -> Self {
        Self(self.0 + right.0)
    }
}

impl PartialEq<i32> for AggSum {
    fn eq(&self, other: &i32) -> bool {
        self.0 == *other
    }
}

/// Digit concatenation: order-sensitive, so shuffled merges are caught.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AggDigit {
    pub val: u64,
    pub len: u32,
}

impl AggregatedData for AggDigit {
    type Data = i32;

    fn from(data: &Self::Data) -> Self {
        Self {
            val: *data as u64,
            len: 1,
        }
    }

    fn merge(self, right: Self) -> Self {
        Self {
            val: self.val * 10u64.pow(right.len) + right.val,
            len: self.len + right.len,
        }
    }
}

impl PartialEq<u64> for AggDigit {
    fn eq(&self, other: &u64) -> bool {
        self.val == *other
    }
}

#[allow(dead_code)]
pub static LOGGER: LazyLock<Mutex<LoggerHandle>> = LazyLock::new(|| {
    Mutex::new(
        Logger::try_with_env_or_str("info")
            .unwrap()
            .write_mode(flexi_logger::WriteMode::SupportCapture)
            .log_to_stdout()
            .set_palette("196;208;3;7;8".to_owned())
            .format(|w, now, record| {
                let style = flexi_logger::style(record.level());
                write!(
                    w,
                    "{} {pref}[{}] {}{suf}",
                    now.format("%H:%M:%S"),
                    &record.level().as_str()[0..1],
                    record.args(),
                    pref = style.prefix(),
                    suf = style.suffix(),
                )
            })
            .start()
            .unwrap(),
    )
});

#[allow(dead_code)]
pub fn init_logger() {
    let _ = &*LOGGER;
}
