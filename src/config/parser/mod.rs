use nom::{
    branch::*, bytes::complete::*, character::complete::*, combinator::*, multi::*, sequence::*,
    IResult,
};

mod boolean;
mod log_level;
mod name;
mod socket_addr;

use super::*;

pub trait NomParser: Sized {
    fn parse(input: &str) -> IResult<&str, Self>;
}

impl NomParser for u64 {
    #[inline]
    fn parse(input: &str) -> IResult<&str, Self> {
        u64(input)
    }
}

impl NomParser for String {
    fn parse(input: &str) -> IResult<&str, Self> {
        map(is_not(" \t\r\n"), ToString::to_string)(input)
    }
}

fn comment(input: &str) -> IResult<&str, Option<&str>> {
    opt(preceded(space1, preceded(char('#'), not_line_ending)))(input)
}

fn parse_item<'a, T: NomParser>(keyword: &'static str) -> impl FnMut(&'a str) -> IResult<&'a str, T> {
    preceded(tuple((space0, tag_no_case(keyword), space1)), T::parse)
}

/// Parses a single configuration line, a trailing `# comment` is allowed.
pub fn parse_config(input: &str) -> IResult<&str, OneConfig> {
    let zone = preceded(
        tuple((space0, tag_no_case("zone"), space1)),
        separated_list1(space1, <Name as NomParser>::parse),
    );

    // a bare `mikrotik-insecure` turns the option on
    let insecure = map(
        preceded(
            pair(space0, tag_no_case("mikrotik-insecure")),
            opt(preceded(space1, <bool as NomParser>::parse)),
        ),
        |v| OneConfig::MikroTikInsecure(v.unwrap_or(true)),
    );

    terminated(
        alt((
            map(parse_item("bind"), OneConfig::Bind),
            map(zone, OneConfig::Zone),
            map(parse_item("mikrotik-url"), OneConfig::MikroTikUrl),
            map(parse_item("mikrotik-username"), OneConfig::MikroTikUsername),
            map(parse_item("mikrotik-password"), OneConfig::MikroTikPassword),
            map(parse_item("mikrotik-timeout"), OneConfig::MikroTikTimeout),
            insecure,
            map(parse_item("server"), OneConfig::Server),
            map(parse_item("tcp-idle-time"), OneConfig::TcpIdleTime),
            map(parse_item("log-level"), OneConfig::LogLevel),
        )),
        comment,
    )(input)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn test_parse_credentials() {
        assert_eq!(
            parse_config("mikrotik-url https://192.168.88.1"),
            Ok((
                "",
                OneConfig::MikroTikUrl("https://192.168.88.1".to_string())
            ))
        );
        assert_eq!(
            parse_config("  MikroTik-Username api"),
            Ok(("", OneConfig::MikroTikUsername("api".to_string())))
        );
        assert_eq!(
            parse_config("mikrotik-password s3cr#t # the api password"),
            Ok(("", OneConfig::MikroTikPassword("s3cr#t".to_string())))
        );
    }

    #[test]
    fn test_parse_zone() {
        assert_eq!(
            parse_config("zone example.org lan. # home"),
            Ok((
                "",
                OneConfig::Zone(vec![
                    Name::from_str("example.org").unwrap(),
                    Name::from_str("lan.").unwrap()
                ])
            ))
        );
        assert!(parse_config("zone").is_err());
    }

    #[test]
    fn test_parse_insecure() {
        assert_eq!(
            parse_config("mikrotik-insecure"),
            Ok(("", OneConfig::MikroTikInsecure(true)))
        );
        assert_eq!(
            parse_config("mikrotik-insecure no"),
            Ok(("", OneConfig::MikroTikInsecure(false)))
        );
        assert_eq!(
            parse_config("mikrotik-insecure # trusted network"),
            Ok(("", OneConfig::MikroTikInsecure(true)))
        );

        let (rest, _) = parse_config("mikrotik-insecure foobar").unwrap();
        assert_eq!(rest, " foobar");
    }

    #[test]
    fn test_parse_numbers() {
        assert_eq!(
            parse_config("mikrotik-timeout 5"),
            Ok(("", OneConfig::MikroTikTimeout(5)))
        );
        assert_eq!(
            parse_config("tcp-idle-time 30"),
            Ok(("", OneConfig::TcpIdleTime(30)))
        );
        assert!(parse_config("mikrotik-timeout soon").is_err());
    }

    #[test]
    fn test_parse_addresses() {
        assert_eq!(
            parse_config("bind :5353"),
            Ok(("", OneConfig::Bind("0.0.0.0:5353".parse().unwrap())))
        );
        assert_eq!(
            parse_config("server 1.1.1.1"),
            Ok(("", OneConfig::Server("1.1.1.1:53".parse().unwrap())))
        );
    }

    #[test]
    fn test_parse_log_level() {
        assert_eq!(
            parse_config("log-level debug"),
            Ok(("", OneConfig::LogLevel(Level::DEBUG)))
        );
    }

    #[test]
    fn test_unknown_keyword() {
        assert!(parse_config("cache-size 512").is_err());
        assert!(parse_config("url http://localhost").is_err());
    }
}
