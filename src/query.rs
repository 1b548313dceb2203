//! Interactive `MM-YYYY` lookup of detailed bills.

use std::io::{self, BufRead, Write};

use crate::billing::segment::BillingCycles;
use crate::billing::tariff::Tariff;
use crate::error::BillingError;
use crate::report::write_detail;

const PROMPT: &str = "Enter a billing month as MM-YYYY, or 'q' to quit: ";
const FORMAT_HINT: &str = "Invalid input. Please enter month and year in the format MM-YYYY, or 'q' to quit.";

/// Prompts for cycle keys until `q` or end of input, printing the detailed
/// breakdown of each cycle found.
///
/// # Errors
///
/// Returns an `io::Error` if reading input or writing output fails.
pub fn run_query_loop(
    cycles: &BillingCycles,
    tariff: &Tariff,
    mut input: impl BufRead,
    mut out: impl Write,
) -> io::Result<()> {
    let mut line = String::new();
    loop {
        write!(out, "{PROMPT}")?;
        out.flush()?;

        line.clear();
        if input.read_line(&mut line)? == 0 {
            writeln!(out)?;
            break;
        }
        let answer = line.trim();
        if answer.eq_ignore_ascii_case("q") {
            break;
        }

        match cycles.lookup(answer) {
            Ok(cycle) => write_detail(cycle, tariff, &mut out)?,
            Err(BillingError::CycleNotFound(key)) => {
                writeln!(out, "No billing cycle found for {key}. Please try again.")?;
            }
            Err(_) => writeln!(out, "{FORMAT_HINT}")?,
        }
    }
    writeln!(out, "Goodbye.")?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::billing::test_support::{hourly, ts};
    use crate::billing::{price_all, segment};
    use rust_decimal::dec;

    fn run(script: &str) -> String {
        let readings = hourly(ts(2024, 1, 1, 0, 0), 24 * 40, dec!(1), dec!(2));
        let mut cycles = segment(&readings).unwrap();
        let tariff = Tariff::b19();
        price_all(&mut cycles, &tariff).unwrap();

        let mut out = Vec::new();
        run_query_loop(&cycles, &tariff, script.as_bytes(), &mut out).unwrap();
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn quit_immediately() {
        let out = run("q\n");
        assert_eq!(out.matches(PROMPT).count(), 1);
        assert!(out.ends_with("Goodbye.\n"));
    }

    #[test]
    fn known_key_prints_detail() {
        let out = run("02-2024\nq\n");
        assert!(out.contains("Detailed Bill Information"));
        assert!(out.contains("Start Date: 02-01-2024"));
        assert_eq!(out.matches(PROMPT).count(), 2);
    }

    #[test]
    fn malformed_input_gets_format_hint() {
        let out = run("2024-02\n13-2024\nq\n");
        assert_eq!(out.matches(FORMAT_HINT).count(), 2);
        assert!(!out.contains("Detailed Bill Information"));
    }

    #[test]
    fn unknown_key_is_reported() {
        let out = run("07-2023\nq\n");
        assert!(out.contains("No billing cycle found for 07-2023"));
    }

    #[test]
    fn end_of_input_quits() {
        let out = run(" 01-2024 \n");
        assert!(out.contains("Start Date: 01-01-2024"));
        assert!(out.ends_with("Goodbye.\n"));
    }
}
