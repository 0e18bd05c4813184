use super::*;
use std::str::FromStr;

impl NomParser for Name {
    fn parse(input: &str) -> IResult<&str, Self> {
        map_res(is_not(" \t\r\n#"), Name::from_str)(input)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse() {
        let (rest, name) = <Name as NomParser>::parse("example.org. lan").unwrap();
        assert_eq!(rest, " lan");
        assert_eq!(name, Name::from_str("example.org.").unwrap());
        assert!(<Name as NomParser>::parse("#comment").is_err());
    }
}
