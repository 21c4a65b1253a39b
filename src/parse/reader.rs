use crate::Result;
use crate::parse::row::{parse_computation_row, parse_operation_row};
use crate::trace::{Chiplet, Trace};
use anyhow::{Context, bail};
use log::warn;
use regex::Regex;
use std::fs;

const CHIPLET_MARKER: &str = "===== CHIPLET";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Section {
    None,
    Computations,
    Operations,
}

/// Parse a chiplet trace file.
///
/// Layout:
/// # Mesh: 2x2
/// # Network: DNN
/// ===== CHIPLET 0 (0,0) =====
/// [COMPUTATIONS]
/// ...
/// [ORDERED_OPERATIONS]
/// ...
pub fn parse_trace_file(path: &str) -> Result<Trace> {
    let text = fs::read_to_string(path).with_context(|| format!("read trace file {}", path))?;
    parse_trace_str(&text, path)
}

/// Parse trace text. `origin` names the source in error and warning messages.
pub fn parse_trace_str(text: &str, origin: &str) -> Result<Trace> {
    TraceParser::new()?.parse(text, origin)
}

struct TraceParser {
    chiplet_re: Regex,
}

impl TraceParser {
    fn new() -> Result<Self> {
        Ok(Self {
            chiplet_re: Regex::new(r"CHIPLET (\d+) \((\d+),(\d+)\)")?,
        })
    }

    fn parse(&self, text: &str, origin: &str) -> Result<Trace> {
        let mut trace = Trace::new();
        // Chiplet under construction and the line its header was on.
        let mut current: Option<(Chiplet, usize)> = None;
        let mut section = Section::None;

        for (lineno, raw) in text.lines().enumerate() {
            let lno = lineno + 1;
            let line = raw.trim();

            if line.starts_with(CHIPLET_MARKER) {
                if let Some((chiplet, at)) = current.take() {
                    finish_chiplet(&mut trace, chiplet, origin, at)?;
                }
                current = Some((self.parse_chiplet_header(line, origin, lno)?, lno));
                section = Section::None;
                continue;
            }

            let Some((chiplet, _)) = current.as_mut() else {
                parse_header_line(&mut trace, line, origin, lno)?;
                continue;
            };

            match line {
                "[COMPUTATIONS]" => {
                    section = Section::Computations;
                    continue;
                }
                "[ORDERED_OPERATIONS]" => {
                    section = Section::Operations;
                    continue;
                }
                _ => {}
            }

            if line.is_empty() || line.starts_with('#') {
                continue;
            }

            match section {
                Section::Computations => match parse_computation_row(line) {
                    Ok(comp) => chiplet.computations.push(comp),
                    Err(e) => warn!("{}:{}: skipping computation row: {:#}", origin, lno, e),
                },
                Section::Operations => match parse_operation_row(line) {
                    Ok(op) => chiplet.operations.push_back(op),
                    Err(e) => warn!("{}:{}: skipping operation row: {:#}", origin, lno, e),
                },
                Section::None => {}
            }
        }

        if let Some((chiplet, at)) = current {
            finish_chiplet(&mut trace, chiplet, origin, at)?;
        }

        Ok(trace)
    }

    /// Parse "===== CHIPLET 3 (1,0) =====".
    fn parse_chiplet_header(&self, line: &str, origin: &str, lno: usize) -> Result<Chiplet> {
        let caps = match self.chiplet_re.captures(line) {
            Some(c) => c,
            None => bail!(
                "trace parse error at {}:{}: bad chiplet header: {:?}",
                origin,
                lno,
                line
            ),
        };

        let field = |idx: usize| -> Result<u32> {
            caps[idx]
                .parse()
                .with_context(|| format!("bad chiplet header at {}:{}: {:?}", origin, lno, line))
        };

        Ok(Chiplet::new(field(1)?, field(2)?, field(3)?))
    }
}

fn finish_chiplet(trace: &mut Trace, chiplet: Chiplet, origin: &str, lno: usize) -> Result<()> {
    let id = chiplet.id;
    if trace.insert(chiplet).is_some() {
        bail!("duplicate chiplet {} in trace at {}:{}", id, origin, lno);
    }
    Ok(())
}

/// Metadata lines ahead of the first chiplet block. Anything else is ignored.
fn parse_header_line(trace: &mut Trace, line: &str, origin: &str, lno: usize) -> Result<()> {
    let Some(rest) = line.strip_prefix('#') else {
        return Ok(());
    };
    let Some((key, value)) = rest.split_once(':') else {
        return Ok(());
    };
    let value = value.trim();

    let count = |what: &str| -> Result<u64> {
        value
            .parse()
            .with_context(|| format!("bad {} at {}:{}: {:?}", what, origin, lno, value))
    };

    match key.trim() {
        "Mesh" => trace.mesh = value.to_string(),
        "Network" => trace.network = value.to_string(),
        "Total Batch" => trace.total_batch = count("total batch")?,
        "Total Chiplets" => trace.total_chiplets = count("total chiplets")?,
        _ => {}
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::trace::{OpKind, Operation, Peer};
    use pretty_assertions::assert_eq;

    const SMALL: &str = "\
# Chiplet Simulation Trace
# Mesh: 1x2
# Network: DNN
# Total Batch: 4
# Total Chiplets: 2

===== CHIPLET 0 (0,0) =====

[COMPUTATIONS]
# Layer | Type | IFMAP_H | IFMAP_W | Filter_H | Filter_W | Channels | NumFilters | Stride_H | Stride_W | Extra | Batch | OutputRange
conv1 | conv | 8 | 8 | 3 | 3 | 3 | 16 | 1 | 1 | - | [0,4) | C[0,16)H[0,8)W[0,8)

[ORDERED_OPERATIONS]
# Seq | Type    | Peer | Layer           | Size     | TransferID
    0 | RECV    | DRAM |     conv1_ifmap |     2048 | T0
    1 | COMPUTE | -    |           conv1 |        0 | T-1
    2 | SEND    |    1 |  conv1_to_conv2 |     1024 | T1

===== CHIPLET 1 (0,1) =====

[COMPUTATIONS]

[ORDERED_OPERATIONS]
    0 | RECV    |    0 |  conv2_from_conv1 |     1024 | T1
    1 | COMPUTE | -    |           conv2 |        0 | T-1
";

    #[test]
    fn parses_header_and_blocks() {
        let trace = parse_trace_str(SMALL, "small").unwrap();
        assert_eq!(trace.mesh, "1x2");
        assert_eq!(trace.network, "DNN");
        assert_eq!(trace.total_batch, 4);
        assert_eq!(trace.total_chiplets, 2);
        assert_eq!(trace.chiplets.len(), 2);

        let c0 = &trace.chiplets[&0];
        assert_eq!((c0.row, c0.col), (0, 0));
        assert_eq!(c0.computations.len(), 1);
        assert_eq!(c0.operations.len(), 3);
        assert_eq!(
            c0.operations[2],
            Operation::new(2, OpKind::Send, Peer::Node(1), "conv1_to_conv2", 1024, "T1")
        );

        let c1 = &trace.chiplets[&1];
        assert_eq!(c1.col, 1);
        assert!(c1.computations.is_empty());
        assert_eq!(c1.operations[0].peer, Peer::Node(0));
    }

    #[test]
    fn skips_malformed_rows() {
        let text = "\
===== CHIPLET 0 (0,0) =====
[ORDERED_OPERATIONS]
    0 | SEND | 1 | l | 8 | T0
    1 | SEND | 1 | l
    2 | TELEPORT | 1 | l | 8 | T1
    3 | RECV | 1 | l | 8 | T2
";
        let trace = parse_trace_str(text, "t").unwrap();
        let seqs: Vec<u64> = trace.chiplets[&0].operations.iter().map(|o| o.seq).collect();
        assert_eq!(seqs, vec![0, 3]);
    }

    #[test]
    fn rows_outside_a_section_are_ignored() {
        let text = "\
===== CHIPLET 0 (0,0) =====
    0 | SEND | 1 | l | 8 | T0
";
        let trace = parse_trace_str(text, "t").unwrap();
        assert!(trace.chiplets[&0].operations.is_empty());
    }

    #[test]
    fn missing_header_keeps_defaults() {
        let trace = parse_trace_str("===== CHIPLET 5 (1,2) =====\n", "t").unwrap();
        assert_eq!(trace.mesh, "");
        assert_eq!(trace.total_batch, 0);
        assert_eq!(trace.chiplets[&5].row, 1);
    }

    #[test]
    fn bad_chiplet_header_is_an_error() {
        let err = parse_trace_str("# Mesh: 1x1\n===== CHIPLET zero =====\n", "bad.txt")
            .unwrap_err()
            .to_string();
        assert!(err.contains("bad.txt:2"), "{}", err);
    }

    #[test]
    fn duplicate_chiplet_is_an_error() {
        let text = "===== CHIPLET 0 (0,0) =====\n===== CHIPLET 0 (0,1) =====\n";
        let err = parse_trace_str(text, "dup").unwrap_err().to_string();
        assert!(err.contains("duplicate chiplet 0"), "{}", err);
    }

    #[test]
    fn bad_batch_count_is_an_error() {
        assert!(parse_trace_str("# Total Batch: many\n", "t").is_err());
    }

    #[test]
    fn empty_text_gives_empty_trace() {
        assert_eq!(parse_trace_str("", "t").unwrap(), Trace::new());
    }
}
