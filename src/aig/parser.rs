use std::{
    fs::File,
    io::{BufRead, BufReader, Read},
    path::Path,
};

use crate::{
    Aig, NodeId, Ref, Result,
    aig::error::{Feature, ParserError},
};

fn read_u64(s: &str) -> std::result::Result<u64, ParserError> {
    s.parse::<u64>()
        .map_err(|_| ParserError::InvalidToken(s.to_string() + " expected u64"))
}

fn check_positive(x: u64) -> std::result::Result<(), ParserError> {
    if x == 0 {
        return Err(ParserError::InvalidToken(
            "expected literal to be positive, got 0".to_string(),
        ));
    }
    Ok(())
}

fn check_even(x: u64) -> std::result::Result<(), ParserError> {
    if x & 1 == 1 {
        return Err(ParserError::InvalidToken(
            "expected literal to be even, got ".to_string() + &x.to_string(),
        ));
    }
    Ok(())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Header {
    m: u64,
    i: u64,
    l: u64,
    o: u64,
    a: u64,
}

impl TryFrom<&str> for Header {
    type Error = ParserError;

    fn try_from(line: &str) -> std::result::Result<Self, Self::Error> {
        let tokens = line.trim().split_whitespace().collect::<Vec<&str>>();

        if tokens.is_empty() {
            return Err(ParserError::InvalidToken(
                "missing header tokens".to_string(),
            ));
        }

        match tokens[0] {
            "aag" => (),
            // The binary variant shares the header shape but is an explicit
            // rejection, never a partial parse.
            "aig" => return Err(ParserError::Unsupported(Feature::BinaryFormat)),
            other => {
                return Err(ParserError::InvalidToken(
                    "expected aag, got ".to_string() + other,
                ));
            }
        }

        if tokens.len() != 6 {
            return Err(ParserError::InvalidToken(
                "header must be `aag M I L O A`".to_string(),
            ));
        }

        let m = read_u64(tokens[1])?;
        let i = read_u64(tokens[2])?;
        let l = read_u64(tokens[3])?;
        let o = read_u64(tokens[4])?;
        let a = read_u64(tokens[5])?;

        Ok(Header { m, i, l, o, a })
    }
}

/// Reads the next body line; an exhausted reader is a parse error.
fn read_line(reader: &mut BufReader<impl Read>) -> std::result::Result<String, ParserError> {
    let mut line = String::new();
    let n = reader
        .read_line(&mut line)
        .map_err(|e| ParserError::Io(e.to_string()))?;
    if n == 0 {
        return Err(ParserError::InvalidToken(
            "unexpected end of file".to_string(),
        ));
    }
    Ok(line)
}

/// Skips pre-header comment lines (leading 'c') and parses the header.
fn find_header(reader: &mut BufReader<impl Read>) -> std::result::Result<Header, ParserError> {
    loop {
        let line = read_line(reader)?;
        if line.starts_with('c') {
            log::debug!("skipping pre-header comment {:?}", line.trim_end());
            continue;
        }
        return Header::try_from(line.as_str());
    }
}

fn read_input(line: &str) -> std::result::Result<NodeId, ParserError> {
    let tokens = line.trim().split_whitespace().collect::<Vec<&str>>();

    if tokens.is_empty() {
        return Err(ParserError::InvalidToken(
            "expected input token, got nothing".to_string(),
        ));
    }

    if tokens.len() > 1 {
        return Err(ParserError::InvalidToken(
            "expected nothing after input, got ".to_string() + tokens[1],
        ));
    }

    let i = read_u64(tokens[0])?;
    check_positive(i)?;
    // Inputs must be referenced with non-negated literals only.
    check_even(i)?;
    Ok(i >> 1)
}

fn read_output(line: &str) -> std::result::Result<Ref, ParserError> {
    let tokens = line.trim().split_whitespace().collect::<Vec<&str>>();

    if tokens.is_empty() {
        return Err(ParserError::InvalidToken(
            "expected output token, got nothing".to_string(),
        ));
    }

    if tokens.len() > 1 {
        return Err(ParserError::InvalidToken(
            "expected nothing after output, got ".to_string() + tokens[1],
        ));
    }

    let o = read_u64(tokens[0])?;
    check_positive(o)?;
    Ok(Ref::from_literal(o))
}

fn read_and(line: &str) -> std::result::Result<(NodeId, Ref, Ref), ParserError> {
    let tokens = line.trim().split_whitespace().collect::<Vec<&str>>();

    if tokens.len() < 3 {
        return Err(ParserError::InvalidToken(
            "not enough and tokens".to_string(),
        ));
    }

    if tokens.len() > 3 {
        return Err(ParserError::InvalidToken(
            "expected nothing after and tokens, got ".to_string() + tokens[3],
        ));
    }

    let lhs = read_u64(tokens[0])?;
    let left = read_u64(tokens[1])?;
    let right = read_u64(tokens[2])?;

    // The lhs names a fresh node, so it is a plain (even) literal.
    check_positive(lhs)?;
    check_even(lhs)?;
    check_positive(left)?;
    check_positive(right)?;

    Ok((lhs >> 1, Ref::from_literal(left), Ref::from_literal(right)))
}

impl Aig {
    /// Parses an AIG from ASCII AIGER text.
    ///
    /// Comment lines (leading `c`) are permitted before the header and
    /// discarded. Body sections are read strictly in header order; the
    /// optional symbol/comment tail after the AND gates is ignored
    /// entirely. The binary variant and latches are rejected with
    /// [`ParserError::Unsupported`]. On any failure no partial graph is
    /// returned.
    pub fn from_ascii(mut reader: BufReader<impl Read>) -> Result<Self> {
        let header = find_header(&mut reader)?;

        if header.l > 0 {
            return Err(ParserError::Unsupported(Feature::Latches).into());
        }

        let mut inputs = Vec::with_capacity(header.i as usize);
        for _ in 0..header.i {
            inputs.push(read_input(&read_line(&mut reader)?)?);
        }

        // The latch section is structurally absent when L == 0.

        let mut outputs = Vec::with_capacity(header.o as usize);
        for _ in 0..header.o {
            outputs.push(read_output(&read_line(&mut reader)?)?);
        }

        let mut gates = Vec::with_capacity(header.a as usize);
        for _ in 0..header.a {
            gates.push(read_and(&read_line(&mut reader)?)?);
        }

        Aig::new(header.m, inputs, outputs, gates)
    }

    /// Parses an AIG from an in-memory ASCII AIGER string.
    pub fn from_ascii_str(text: &str) -> Result<Self> {
        Aig::from_ascii(BufReader::new(text.as_bytes()))
    }

    /// Creates an AIG from an `.aag` file.
    ///
    /// `.aig` files hold the binary variant, which is rejected as an
    /// unsupported feature rather than parsed.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        match path.as_ref().extension().and_then(|ext| ext.to_str()) {
            Some("aag") => {
                let f = File::open(path.as_ref()).map_err(|e| ParserError::Io(e.to_string()))?;
                Aig::from_ascii(BufReader::new(f))
            }
            Some("aig") => Err(ParserError::Unsupported(Feature::BinaryFormat).into()),
            _ => Err(ParserError::Io("invalid extension, expected .aag".to_string()).into()),
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::{AigError, AigNode};

    #[test]
    fn read_u64_test() {
        assert!(read_u64("").is_err());
        assert!(read_u64(" ").is_err());
        assert!(read_u64(" 2").is_err());
        assert!(read_u64("2 ").is_err());
        assert!(read_u64("-5").is_err());

        assert_eq!(read_u64("42").unwrap(), 42);
        assert_eq!(read_u64("0").unwrap(), 0);
    }

    #[test]
    fn header_try_from_test() {
        assert!(Header::try_from("").is_err());
        assert!(Header::try_from("aag 0 0 0 0").is_err());
        assert!(Header::try_from("aag 0 0 0 0 0 0").is_err());
        assert!(Header::try_from("aag 1 1 -1 1 1").is_err());
        assert!(Header::try_from("nope 0 0 0 0 0").is_err());

        assert_eq!(
            Header::try_from("   aag 0 0 0 0 0 ").unwrap(),
            Header {
                m: 0,
                i: 0,
                l: 0,
                o: 0,
                a: 0
            }
        );
        assert_eq!(
            Header::try_from("aag 5 2 1 0 2     ").unwrap(),
            Header {
                m: 5,
                i: 2,
                l: 1,
                o: 0,
                a: 2
            }
        );

        // The binary variant is a distinct, explicit rejection.
        assert!(matches!(
            Header::try_from("aig 0 0 0 0 0"),
            Err(ParserError::Unsupported(Feature::BinaryFormat))
        ));
    }

    #[test]
    fn read_input_test() {
        assert!(read_input("").is_err());
        assert!(read_input(" ").is_err());
        assert!(read_input("-5").is_err());
        assert!(read_input("2 14").is_err());
        assert!(read_input("4 z").is_err());
        // Odd input literals are invalid: inputs are non-negated.
        assert!(read_input("3").is_err());
        // Non-positive literal.
        assert!(read_input("0").is_err());

        assert_eq!(read_input(" 2").unwrap(), 1);
        assert_eq!(read_input("2 ").unwrap(), 1);
        assert_eq!(read_input("   42  ").unwrap(), 21);
    }

    #[test]
    fn read_output_test() {
        assert!(read_output("").is_err());
        assert!(read_output(" ").is_err());
        assert!(read_output("-5").is_err());
        assert!(read_output("2 14").is_err());
        assert!(read_output("4 z").is_err());
        assert!(read_output("0").is_err());

        assert_eq!(read_output(" 2").unwrap(), Ref::positive(1));
        assert_eq!(read_output("3 ").unwrap(), Ref::new(1, true));
        assert_eq!(read_output("   42  ").unwrap(), Ref::positive(21));
        // Constant true is a valid output.
        assert_eq!(read_output("1").unwrap(), Ref::TRUE);
    }

    #[test]
    fn read_and_test() {
        assert!(read_and("").is_err());
        assert!(read_and(" ").is_err());
        assert!(read_and("-5").is_err());
        assert!(read_and("2 14").is_err());
        assert!(read_and("4 18 2 2").is_err());
        // Odd lhs does not name a fresh node.
        assert!(read_and("3 2 1").is_err());
        // Non-positive operand literals.
        assert!(read_and("2 0 4").is_err());
        assert!(read_and("2 4 0").is_err());

        assert_eq!(
            read_and("2 6 7").unwrap(),
            (1, Ref::positive(3), Ref::new(3, true))
        );
        assert_eq!(
            read_and("6 1 4").unwrap(),
            (3, Ref::TRUE, Ref::positive(2))
        );
        assert_eq!(
            read_and("   42   5 19   ").unwrap(),
            (21, Ref::new(2, true), Ref::new(9, true))
        );
    }

    #[test]
    fn parse_and_of_two_inputs() {
        // Header `aag 3 2 0 1 1`, inputs 2 and 4, output 6, gate 6 = 2 AND 4.
        let text = "aag 3 2 0 1 1\n2\n4\n6\n6 2 4\n";
        let aig = Aig::from_ascii_str(text).unwrap();

        assert_eq!(aig.get_inputs(), &[1, 2]);
        assert_eq!(aig.get_ands(), &[3]);
        assert_eq!(aig.get_outputs(), &[Ref::positive(3)]);
        assert_eq!(
            aig.get_node(3),
            Some(&AigNode::and(3, Ref::positive(1), Ref::positive(2)))
        );

        // AND semantics: true only for (true, true).
        for (a, b) in [(false, false), (false, true), (true, false), (true, true)] {
            assert_eq!(aig.evaluate_outputs(&[a, b]).unwrap(), vec![a && b]);
        }
    }

    #[test]
    fn parse_is_deterministic() {
        let text = "aag 5 2 0 1 3\n2\n4\n11\n6 2 4\n8 3 5\n10 7 9\n";
        let a = Aig::from_ascii_str(text).unwrap();
        let b = Aig::from_ascii_str(text).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn parse_pre_header_comments() {
        let text = "c generated by a test\nc another comment\naag 1 1 0 1 0\n2\n2\n";
        let aig = Aig::from_ascii_str(text).unwrap();
        assert_eq!(aig.get_inputs(), &[1]);
        assert_eq!(aig.get_outputs(), &[Ref::positive(1)]);
    }

    #[test]
    fn parse_ignores_symbol_tail() {
        let text = "aag 3 2 0 1 1\n2\n4\n6\n6 2 4\ni0 foo\ni1 bar\no0 baz\nc\nwhatever follows\n";
        let aig = Aig::from_ascii_str(text).unwrap();
        assert_eq!(aig.get_ands(), &[3]);
    }

    #[test]
    fn parse_rejects_latches_as_unsupported() {
        let text = "aag 4 2 1 1 1\n2\n4\n6 8\n8\n8 2 4\n";
        assert!(matches!(
            Aig::from_ascii_str(text),
            Err(AigError::Parser(ParserError::Unsupported(Feature::Latches)))
        ));
    }

    #[test]
    fn parse_rejects_binary_format_as_unsupported() {
        assert!(matches!(
            Aig::from_ascii_str("aig 0 0 0 0 0\n"),
            Err(AigError::Parser(ParserError::Unsupported(
                Feature::BinaryFormat
            )))
        ));
    }

    #[test]
    fn parse_rejects_id_above_max_index() {
        // Gate id 4 exceeds M=3.
        let text = "aag 3 2 0 1 1\n2\n4\n8\n8 2 4\n";
        assert!(matches!(
            Aig::from_ascii_str(text),
            Err(AigError::IdOutOfRange { id: 4, .. })
        ));
    }

    #[test]
    fn parse_rejects_malformed_bodies() {
        // Truncated file.
        assert!(Aig::from_ascii_str("aag 3 2 0 1 1\n2\n4\n").is_err());
        // Odd input literal.
        assert!(Aig::from_ascii_str("aag 1 1 0 0 0\n3\n").is_err());
        // Garbage after the header.
        assert!(Aig::from_ascii_str("aag 1 1 0 0 0\nc comment in body\n").is_err());
        // Header count not covering the body.
        assert!(Aig::from_ascii_str("aag 4 2 0 0 1\n2\n4\n6 2 4\n").is_err());
    }

    #[test]
    fn from_file_rejects_unknown_extension() {
        assert!(matches!(
            Aig::from_file("missing.txt"),
            Err(AigError::Parser(ParserError::Io(_)))
        ));
        assert!(matches!(
            Aig::from_file("circuit.aig"),
            Err(AigError::Parser(ParserError::Unsupported(
                Feature::BinaryFormat
            )))
        ));
    }
}
