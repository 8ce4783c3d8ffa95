use argscope::{
    present, Collection, CommandLineParser, GeneralParser, Group, Nargs, Optional, Parameter,
    Parsed, Rule, Scalar,
};

#[derive(Debug, Default, PartialEq, Eq)]
pub struct Params {
    verbose: bool,
    host: String,
    port: u16,
    replica: Option<String>,
    targets: Vec<String>,
}

fn main() {
    let (params, parsed) = parse();

    if params.verbose {
        println!("{params:?}");
    }

    let database = if parsed.is_set("--db") {
        format!("{}:{}", params.host, params.port)
    } else {
        "none".to_string()
    };
    println!("Deploying {:?} (database: {database}).", params.targets);
}

// Configure and execute the parser against `env::args`.
fn parse() -> (Params, Parsed) {
    parse_tokens(|parser: GeneralParser| Ok(parser.parse()))
}

// Unit-testable function to configure the parser and execute it against the specified tokens.
fn parse_tokens(parse_fn: impl FnOnce(GeneralParser) -> Result<Parsed, i32>) -> (Params, Parsed) {
    let mut params = Params::default();

    let clp = CommandLineParser::new("grouped");
    let parser = clp
        .about("Deploy the targets, optionally against a database.")
        .add(Parameter::option(Scalar::new(&mut params.verbose), "--verbose").alias("-v"))
        .group(
            Group::new("--db")
                .help("The database connection.")
                .add(Parameter::option(Scalar::new(&mut params.host), "--host"))
                .add(Parameter::option(Scalar::new(&mut params.port), "--port").alias("-p"))
                .add(Parameter::option(Optional::new(&mut params.replica), "--replica")),
        )
        .add(Parameter::argument(
            Collection::new(&mut params.targets, Nargs::AtLeastOne),
            "target",
        ))
        .rule(Rule::dependency("--db > --port", ["--db > --host"]))
        .rule(
            Rule::when(present("--db > --replica"))
                .require(present("--db > --port"))
                .message("A replica needs an explicit port."),
        )
        .build();

    // The parse_fn signature is a `Result`.
    // However, since `GeneralParser::parse` does not return an error (it uses `std::process::exit` under the hood), the `Err` case is only reached via test.
    let parsed = parse_fn(parser).expect("test-reachable-only");
    (params, parsed)
}
