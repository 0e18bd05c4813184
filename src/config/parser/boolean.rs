use super::*;

impl NomParser for bool {
    fn parse(input: &str) -> IResult<&str, Self> {
        alt((
            value(
                true,
                alt((
                    tag_no_case("true"),
                    tag_no_case("yes"),
                    tag_no_case("on"),
                    tag("1"),
                )),
            ),
            value(
                false,
                alt((
                    tag_no_case("false"),
                    tag_no_case("no"),
                    tag_no_case("off"),
                    tag("0"),
                )),
            ),
        ))(input)
    }
}
