//! Trade records and the per-file trade reader.
//!
//! A trade file holds a fixed-size header followed by comma-separated records
//! `ticker,timestamp,price,quantity`. `TradeFileReader` yields them lazily, one
//! `Result` per non-blank line, so that a malformed line costs exactly that line.
//! `PriceSeries::from_file` drains a reader, logs and drops the bad lines, and
//! resolves which ticker the prices belong to.
use std::fs::File;
use std::io::Read;
use std::path::Path;

use csv::{ByteRecord, ByteRecordsIntoIter, ReaderBuilder, StringRecord, Trim};
use log::warn;
use serde::Deserialize;

use crate::config::{Encoding, ReaderOptions, TickerPolicy};
use crate::error::VolatilityError;
use crate::result::Result;

/// Number of comma-separated fields in a trade line.
const FIELDS: usize = 4;

/// One parsed trade.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct TradeRecord {
    /// Security code.
    pub ticker: String,
    /// Trade time, kept as written in the file.
    pub timestamp: String,
    /// Price of one security.
    pub price: f64,
    /// Number of securities traded.
    pub quantity: f64,
}

impl TradeRecord {
    /// Parse a single CSV line.
    pub fn parse_line(line: &str) -> Result<Self> {
        let options = ReaderOptions {
            header_lines: 0,
            ..ReaderOptions::default()
        };
        TradeFileReader::new(line.as_bytes(), &options)
            .next()
            .unwrap_or_else(|| Err(VolatilityError::line_parse(line, "empty line")))
    }

    /// Validate and convert one decoded CSV record.
    pub fn from_record(record: &StringRecord) -> Result<Self> {
        let line = || record.iter().collect::<Vec<_>>().join(",");
        if record.len() != FIELDS {
            return Err(VolatilityError::line_parse(
                &line(),
                format!("expected {} fields, found {}", FIELDS, record.len()),
            ));
        }

        let trade: TradeRecord = record
            .deserialize(None)
            .map_err(|e| VolatilityError::line_parse(&line(), e.to_string()))?;
        if trade.ticker.is_empty() {
            return Err(VolatilityError::line_parse(&line(), "empty ticker"));
        }
        if !trade.price.is_finite() || trade.price < 0.0 {
            return Err(VolatilityError::line_parse(
                &line(),
                format!("price must be a finite non-negative number, got {}", trade.price),
            ));
        }
        Ok(trade)
    }
}

/// Lazy reader over the trade records of one file.
pub struct TradeFileReader<R> {
    records: ByteRecordsIntoIter<R>,
    encoding: Encoding,
    header_left: usize,
}

impl TradeFileReader<File> {
    /// Open `path` for reading.
    pub fn open(path: &Path, options: &ReaderOptions) -> Result<Self> {
        let file = File::open(path).map_err(|source| VolatilityError::FileRead {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(Self::new(file, options))
    }
}

impl<R: Read> TradeFileReader<R> {
    /// Wrap an already opened source.
    pub fn new(source: R, options: &ReaderOptions) -> Self {
        let records = ReaderBuilder::new()
            .has_headers(false)
            .flexible(true)
            .trim(Trim::All)
            .from_reader(source)
            .into_byte_records();
        Self {
            records,
            encoding: options.encoding,
            header_left: options.header_lines,
        }
    }

    fn decode(&self, record: ByteRecord) -> Result<StringRecord> {
        match self.encoding {
            Encoding::Utf8 => StringRecord::from_byte_record(record).map_err(|e| {
                let reason = e.utf8_error().to_string();
                VolatilityError::line_parse(&lossy_line(&e.into_byte_record()), reason)
            }),
            Encoding::Utf8Lossy => Ok(StringRecord::from_byte_record_lossy(record)),
        }
    }
}

impl<R: Read> Iterator for TradeFileReader<R> {
    type Item = Result<TradeRecord>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let record = match self.records.next()? {
                Ok(record) => record,
                Err(e) => {
                    let reason = e.to_string();
                    return Some(Err(match e.into_kind() {
                        // The consumer treats `Io` as the end of this file.
                        csv::ErrorKind::Io(io) => VolatilityError::Io(io),
                        _ => VolatilityError::line_parse("", reason),
                    }));
                }
            };

            if self.header_left > 0 {
                self.header_left -= 1;
                continue;
            }
            if record.iter().all(|field| field.is_empty()) {
                continue;
            }

            return Some(self.decode(record).and_then(|r| TradeRecord::from_record(&r)));
        }
    }
}

fn lossy_line(record: &ByteRecord) -> String {
    record
        .iter()
        .map(String::from_utf8_lossy)
        .collect::<Vec<_>>()
        .join(",")
}

/// Prices of one trade file together with the ticker they are attributed to.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PriceSeries {
    /// Ticker resolved under the configured `TickerPolicy`; `None` if no line parsed.
    pub ticker: Option<String>,
    /// Prices in arrival order.
    pub prices: Vec<f64>,
    /// Lines that failed to parse and were skipped.
    pub skipped: usize,
}

impl PriceSeries {
    /// Read the whole file at `path`.
    pub fn from_file(path: &Path, options: &ReaderOptions) -> Result<Self> {
        let reader = TradeFileReader::open(path, options)?;
        Self::collect_from(path, reader, options.ticker_policy)
    }

    /// Drain `records`, logging and skipping malformed lines.
    ///
    /// A read failure in the middle of the file aborts this file only and is
    /// returned as `FileRead`.
    pub fn collect_from<I>(path: &Path, records: I, policy: TickerPolicy) -> Result<Self>
    where
        I: IntoIterator<Item = Result<TradeRecord>>,
    {
        let mut series = PriceSeries::default();
        let mut first_ticker: Option<String> = None;
        let mut mismatch_logged = false;

        for record in records {
            let record = match record {
                Ok(record) => record,
                Err(VolatilityError::Io(source)) => {
                    return Err(VolatilityError::FileRead {
                        path: path.to_path_buf(),
                        source,
                    });
                }
                Err(e) => {
                    warn!("{}: {}", path.display(), e);
                    series.skipped += 1;
                    continue;
                }
            };

            let first = first_ticker.get_or_insert_with(|| record.ticker.clone());
            if *first != record.ticker {
                match policy {
                    TickerPolicy::Strict => {
                        return Err(VolatilityError::MixedTickers {
                            path: path.to_path_buf(),
                            first: first.clone(),
                            other: record.ticker,
                        });
                    }
                    TickerPolicy::LastSeen if !mismatch_logged => {
                        warn!(
                            "{}: ticker {} differs from {}, the last one seen is reported",
                            path.display(),
                            record.ticker,
                            first
                        );
                        mismatch_logged = true;
                    }
                    TickerPolicy::LastSeen => {}
                }
            }

            series.prices.push(record.price);
            series.ticker = Some(record.ticker);
        }
        Ok(series)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{Cursor, Write};
    use tempfile::NamedTempFile;

    fn options() -> ReaderOptions {
        ReaderOptions::default()
    }

    fn read(content: &str, options: &ReaderOptions) -> Vec<Result<TradeRecord>> {
        TradeFileReader::new(Cursor::new(content.as_bytes().to_vec()), options).collect()
    }

    #[test]
    fn test_parse_line() {
        let record = TradeRecord::parse_line("TICKER,09:00:01,12.5,10").unwrap();
        assert_eq!(record.ticker, "TICKER");
        assert_eq!(record.timestamp, "09:00:01");
        assert_eq!(record.price, 12.5);
        assert_eq!(record.quantity, 10.0);
    }

    #[test]
    fn test_parse_line_accepts_quoted_fields() {
        let record = TradeRecord::parse_line("\"AAA\",\"10:00\",\"12.5\",\"1\"").unwrap();
        assert_eq!(record.ticker, "AAA");
        assert_eq!(record.timestamp, "10:00");
        assert_eq!(record.price, 12.5);

        let record = TradeRecord::parse_line("AAA,\"10:00, MSK\",12.5,1").unwrap();
        assert_eq!(record.timestamp, "10:00, MSK");
        assert_eq!(record.quantity, 1.0);
    }

    #[test]
    fn test_parse_line_trims_fields() {
        let record = TradeRecord::parse_line(" AAA , 10:00 , 12.5 , 3 ").unwrap();
        assert_eq!(record.ticker, "AAA");
        assert_eq!(record.timestamp, "10:00");
        assert_eq!(record.quantity, 3.0);
    }

    #[test]
    fn test_parse_line_rejects_bad_input() {
        for line in [
            "TICKER,09:00:01,12.5",
            "TICKER,09:00:01,12.5,10,extra",
            "TICKER,09:00:01,abc,10",
            "TICKER,09:00:01,12.5,abc",
            "TICKER,09:00:01,-1,10",
            "TICKER,09:00:01,NaN,10",
            "TICKER,09:00:01,inf,10",
            ",09:00:01,12.5,10",
        ] {
            assert!(
                matches!(
                    TradeRecord::parse_line(line),
                    Err(VolatilityError::LineParse { .. })
                ),
                "line {} should be rejected",
                line
            );
        }
    }

    #[test]
    fn test_reader_skips_header_and_blank_lines() {
        let content = "SECID,TRADETIME,PRICE,QUANTITY\nAAA,10:00,1,1\n\n  \nAAA,10:01,2,1\n";
        let records: Vec<TradeRecord> = read(content, &options())
            .into_iter()
            .map(|r| r.unwrap())
            .collect();
        assert_eq!(records.len(), 2);
        assert_eq!(records[1].price, 2.0);
    }

    #[test]
    fn test_reader_handles_quoted_records() {
        let content = "SECID,TRADETIME,PRICE,QUANTITY\n\"AAA\",\"10:00, MSK\",\"11\",\"1\"\r\nAAA,10:01,12,1\r\n";
        let records: Vec<TradeRecord> = read(content, &options())
            .into_iter()
            .map(|r| r.unwrap())
            .collect();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].timestamp, "10:00, MSK");
        assert_eq!(records[0].price, 11.0);
        assert_eq!(records[1].price, 12.0);
    }

    #[test]
    fn test_reader_custom_header_size() {
        let opts = ReaderOptions {
            header_lines: 2,
            ..options()
        };
        let content = "SECID,TRADETIME,PRICE,QUANTITY\nAAA,10:00,1,1\nAAA,10:01,2,1";
        let records = read(content, &opts);
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].as_ref().unwrap().price, 2.0);
    }

    #[test]
    fn test_reader_reports_bad_lines_and_continues() {
        let content = "header\nAAA,10:00,1,1\ngarbage\nAAA,10:01,3,1\n";
        let records = read(content, &options());
        assert_eq!(records.len(), 3);
        assert!(records[0].is_ok());
        assert!(matches!(records[1], Err(VolatilityError::LineParse { .. })));
        assert!(records[2].is_ok());
    }

    #[test]
    fn test_reader_encoding() {
        let bytes = b"header\nAAA,10:00,1,1\n\xff\xfe,10:01,2,1\n".to_vec();
        let strict: Vec<_> = TradeFileReader::new(Cursor::new(bytes.clone()), &options()).collect();
        assert!(strict[0].is_ok());
        assert!(matches!(strict[1], Err(VolatilityError::LineParse { .. })));

        let lossy_opts = ReaderOptions {
            encoding: Encoding::Utf8Lossy,
            ..options()
        };
        let lossy: Vec<_> = TradeFileReader::new(Cursor::new(bytes), &lossy_opts).collect();
        assert!(lossy.iter().all(|r| r.is_ok()));
    }

    #[test]
    fn test_series_last_seen_ticker_wins() {
        let content = "header\nAAA,10:00,1,1\nBBB,10:01,2,1\n";
        let series = PriceSeries::collect_from(
            Path::new("mixed.csv"),
            read(content, &options()),
            TickerPolicy::LastSeen,
        )
        .unwrap();
        assert_eq!(series.ticker.as_deref(), Some("BBB"));
        assert_eq!(series.prices, vec![1.0, 2.0]);
    }

    #[test]
    fn test_series_strict_rejects_mixed_tickers() {
        let content = "header\nAAA,10:00,1,1\nBBB,10:01,2,1\n";
        let result = PriceSeries::collect_from(
            Path::new("mixed.csv"),
            read(content, &options()),
            TickerPolicy::Strict,
        );
        assert!(matches!(result, Err(VolatilityError::MixedTickers { .. })));
    }

    #[test]
    fn test_series_counts_skipped_lines() {
        let content = "header\nbad\nAAA,10:00,1,1\nAAA,x,y,z\n";
        let series = PriceSeries::collect_from(
            Path::new("a.csv"),
            read(content, &options()),
            TickerPolicy::LastSeen,
        )
        .unwrap();
        assert_eq!(series.skipped, 2);
        assert_eq!(series.prices, vec![1.0]);
    }

    #[test]
    fn test_series_from_file() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "SECID,TRADETIME,PRICE,QUANTITY").unwrap();
        writeln!(file, "AAA,10:00,11,1").unwrap();
        writeln!(file, "AAA,10:01,12,1").unwrap();

        let series = PriceSeries::from_file(file.path(), &options()).unwrap();
        assert_eq!(series.ticker.as_deref(), Some("AAA"));
        assert_eq!(series.prices, vec![11.0, 12.0]);
    }

    #[test]
    fn test_series_missing_file() {
        let result = PriceSeries::from_file(Path::new("/definitely/not/here.csv"), &options());
        assert!(matches!(result, Err(VolatilityError::FileRead { .. })));
    }
}
