//! `clap` argument builder/accessor pairs for the `calsearch` binary.

use clap::{value_parser, Arg, ArgAction, ArgMatches, Command};

//fp add_right_ascension_arg
pub fn add_right_ascension_arg(cmd: Command) -> Command {
    cmd.arg(
        Arg::new("right_ascension")
            .long("ra")
            .short('r')
            .required(true)
            .help("Right ascension of the search center, in degrees")
            .value_parser(value_parser!(f64))
            .action(ArgAction::Set),
    )
}
pub fn right_ascension(matches: &ArgMatches) -> f64 {
    *matches.get_one::<f64>("right_ascension").unwrap()
}

//fp add_declination_arg
pub fn add_declination_arg(cmd: Command) -> Command {
    cmd.arg(
        Arg::new("declination")
            .long("dec")
            .short('d')
            .required(true)
            .help("Declination of the search center, in degrees")
            .value_parser(value_parser!(f64))
            .action(ArgAction::Set),
    )
}
pub fn declination(matches: &ArgMatches) -> f64 {
    *matches.get_one::<f64>("declination").unwrap()
}

//fp add_radius_arg
pub fn add_radius_arg(cmd: Command) -> Command {
    cmd.arg(
        Arg::new("radius")
            .long("radius")
            .short('w')
            .help("Cone search radius, in degrees")
            .value_parser(value_parser!(f64))
            .action(ArgAction::Set),
    )
}
pub fn radius(matches: &ArgMatches) -> f64 {
    *matches.get_one::<f64>("radius").unwrap_or(&0.25)
}

//fp add_magnitude_arg
pub fn add_magnitude_arg(cmd: Command) -> Command {
    cmd.arg(
        Arg::new("magnitude")
            .long("max-mag")
            .short('m')
            .help("Maximum V magnitude to keep")
            .value_parser(value_parser!(f64))
            .action(ArgAction::Set),
    )
}
pub fn magnitude(matches: &ArgMatches) -> Option<f64> {
    matches.get_one::<f64>("magnitude").copied()
}

//fp add_fixtures_arg
pub fn add_fixtures_arg(cmd: Command) -> Command {
    cmd.arg(
        Arg::new("fixtures")
            .long("fixtures")
            .help("JSON file of fixture catalog rows to use instead of live catalogs")
            .action(ArgAction::Set),
    )
}
pub fn fixtures(matches: &ArgMatches) -> Option<String> {
    matches.get_one::<String>("fixtures").map(|s| s.to_string())
}

//fp add_local_catalog_arg
pub fn add_local_catalog_arg(cmd: Command) -> Command {
    cmd.arg(
        Arg::new("local_catalog")
            .long("local-catalog")
            .help("Path to a local flat-file catalog to load and merge as ASCC")
            .action(ArgAction::Set),
    )
}
pub fn local_catalog(matches: &ArgMatches) -> Option<String> {
    matches.get_one::<String>("local_catalog").map(|s| s.to_string())
}

//fp add_output_arg
pub fn add_output_arg(cmd: Command) -> Command {
    cmd.arg(
        Arg::new("output")
            .long("output")
            .short('o')
            .help("Write the resulting star list as JSON to this path instead of stdout")
            .action(ArgAction::Set),
    )
}
pub fn output(matches: &ArgMatches) -> Option<String> {
    matches.get_one::<String>("output").map(|s| s.to_string())
}
