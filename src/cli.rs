//! Command-line argument parsing.

use crate::error::{AppError, AppResult};
use crate::store::{FilterCriteria, SortOption};
use clap::{App as ClapApp, Arg, ArgMatches};
use std::str::FromStr;

/// Options gathered from the command line.
///
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Options {
    pub filters: FilterCriteria,
    pub page: usize,
    pub size: Option<usize>,
    pub sort: Option<SortOption>,
    pub config_dir: Option<String>,
    pub name: Option<String>,
    pub email: Option<String>,
    pub save_login: bool,
    pub verbose: bool,
}

/// Returns the argument definitions of the binary.
///
pub fn app() -> ClapApp<'static, 'static> {
    ClapApp::new(env!("CARGO_PKG_NAME"))
        .version(env!("CARGO_PKG_VERSION"))
        .about(env!("CARGO_PKG_DESCRIPTION"))
        .arg(
            Arg::with_name("breed")
                .long("breed")
                .short("b")
                .value_name("BREED")
                .help("Only show dogs of this breed (repeatable)")
                .takes_value(true)
                .multiple(true)
                .number_of_values(1),
        )
        .arg(
            Arg::with_name("age-min")
                .long("age-min")
                .value_name("YEARS")
                .help("Minimum age")
                .takes_value(true),
        )
        .arg(
            Arg::with_name("age-max")
                .long("age-max")
                .value_name("YEARS")
                .help("Maximum age")
                .takes_value(true),
        )
        .arg(
            Arg::with_name("zip")
                .long("zip")
                .short("z")
                .value_name("ZIP")
                .help("Only show dogs in this zip code (repeatable)")
                .takes_value(true)
                .multiple(true)
                .number_of_values(1),
        )
        .arg(
            Arg::with_name("page")
                .long("page")
                .short("p")
                .value_name("PAGE")
                .help("Zero-based page index")
                .takes_value(true),
        )
        .arg(
            Arg::with_name("size")
                .long("size")
                .short("s")
                .value_name("SIZE")
                .help("Results per page")
                .takes_value(true),
        )
        .arg(
            Arg::with_name("sort")
                .long("sort")
                .value_name("FIELD:DIRECTION")
                .help("Sort order, e.g. breed:asc or age:desc")
                .takes_value(true),
        )
        .arg(
            Arg::with_name("config")
                .long("config")
                .short("c")
                .value_name("DIR")
                .help("Directory holding config.yml")
                .takes_value(true),
        )
        .arg(
            Arg::with_name("name")
                .long("name")
                .value_name("NAME")
                .help("Name to log in with")
                .takes_value(true),
        )
        .arg(
            Arg::with_name("email")
                .long("email")
                .value_name("EMAIL")
                .help("Email to log in with")
                .takes_value(true),
        )
        .arg(
            Arg::with_name("save-login")
                .long("save-login")
                .help("Store --name and --email in the configuration file"),
        )
        .arg(
            Arg::with_name("verbose")
                .long("verbose")
                .short("v")
                .help("Log debug output"),
        )
}

/// Convert parsed arguments into options.
///
pub fn options(matches: &ArgMatches) -> AppResult<Options> {
    let filters = FilterCriteria {
        breeds: values(matches, "breed").unwrap_or_default(),
        age_min: number(matches, "age-min")?,
        age_max: number(matches, "age-max")?,
        zip_codes: values(matches, "zip"),
    };
    let sort = matches
        .value_of("sort")
        .map(str::parse::<SortOption>)
        .transpose()?;

    Ok(Options {
        filters,
        page: number(matches, "page")?.unwrap_or(0),
        size: number(matches, "size")?,
        sort,
        config_dir: matches.value_of("config").map(str::to_owned),
        name: matches.value_of("name").map(str::to_owned),
        email: matches.value_of("email").map(str::to_owned),
        save_login: matches.is_present("save-login"),
        verbose: matches.is_present("verbose"),
    })
}

fn values(matches: &ArgMatches, name: &str) -> Option<Vec<String>> {
    matches
        .values_of(name)
        .map(|values| values.map(str::to_owned).collect())
}

fn number<T: FromStr>(matches: &ArgMatches, name: &str) -> AppResult<Option<T>> {
    matches
        .value_of(name)
        .map(|value| {
            value.parse::<T>().map_err(|_| {
                AppError::InvalidArgument(format!(
                    "--{} expects a non-negative number, got '{}'",
                    name, value
                ))
            })
        })
        .transpose()
}
