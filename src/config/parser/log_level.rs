use super::*;

impl NomParser for Level {
    fn parse(input: &str) -> IResult<&str, Self> {
        let trace = value(Level::TRACE, tag_no_case("trace"));
        let debug = value(Level::DEBUG, tag_no_case("debug"));
        let info = value(
            Level::INFO,
            alt((tag_no_case("info"), tag_no_case("notice"))),
        );
        let warn = value(Level::WARN, tag_no_case("warn"));
        let error = value(
            Level::ERROR,
            alt((tag_no_case("error"), tag_no_case("fatal"))),
        );
        alt((trace, debug, info, warn, error))(input)
    }
}
