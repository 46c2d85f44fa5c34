use anyhow::{anyhow, Result};
use clap::{crate_version, App, AppSettings, Arg, ArgMatches, SubCommand};
use gtmpl::{Template, Value};
use ideas::config::Config;
use ideas::controller::{Outcome, PageListController};
use ideas::request::{PageRequest, PageSize, SortKey};
use ideas::source::HttpSource;
use ideas::viewport::Viewport;
use ideas::write::{load_template, Writer};
use log::info;
use std::convert::TryFrom;
use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};
use std::str::FromStr;

type Controller = PageListController<HttpSource, Viewport>;

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let request_args = || {
        vec![
            Arg::with_name("page")
                .long("page")
                .takes_value(true)
                .help("The page to show"),
            Arg::with_name("size")
                .long("size")
                .takes_value(true)
                .possible_values(&["10", "20", "50"])
                .help("Ideas per page"),
            Arg::with_name("sort")
                .long("sort")
                .takes_value(true)
                .possible_values(&["newest", "oldest"])
                .help("Sort order"),
            Arg::with_name("location")
                .long("location")
                .takes_value(true)
                .conflicts_with_all(&["page", "size", "sort"])
                .help("A location query like `page=2&size=20&sort=oldest`"),
            Arg::with_name("scroll")
                .long("scroll")
                .takes_value(true)
                .help("Scroll the viewport to this offset before rendering"),
            Arg::with_name("output")
                .long("output")
                .short("o")
                .takes_value(true)
                .help("Where to write the rendered page"),
            Arg::with_name("config")
                .long("config")
                .takes_value(true)
                .help("The project file (defaults to the nearest ideas.yaml)"),
        ]
    };

    let matches = App::new("ideas")
        .version(crate_version!())
        .about("Renders the Ideas listing")
        .setting(AppSettings::SubcommandRequiredElseHelp)
        .subcommand(
            SubCommand::with_name("render")
                .about("Fetches one page and writes it out")
                .args(&request_args()),
        )
        .subcommand(
            SubCommand::with_name("browse")
                .about("Reads listing commands from stdin, re-rendering after each")
                .args(&request_args()),
        )
        .get_matches();

    match matches.subcommand() {
        ("render", Some(args)) => {
            let session = Session::open(args)?;
            session.render()
        }
        ("browse", Some(args)) => {
            let mut session = Session::open(args)?;
            session.render()?;
            session.browse(io::stdin().lock(), io::stdout())
        }
        _ => Err(anyhow!("Unknown subcommand")),
    }
}

/// A controller plus everything needed to render it.
struct Session {
    controller: Controller,
    template: Template,
    output: PathBuf,
}

impl Session {
    fn open(args: &ArgMatches) -> Result<Session> {
        let config = match args.value_of("config") {
            Some(path) => Config::from_project_file(Path::new(path))?,
            None => Config::from_directory(&std::env::current_dir()?)?,
        };
        let template = load_template(config.template.as_deref())?;
        let output = match args.value_of("output") {
            Some(path) => PathBuf::from(path),
            None => config.output.clone(),
        };

        let source = HttpSource::new(config.endpoint.clone(), &config.asset_host, config.timeout)?;
        let viewport = Viewport::new(config.viewport_width, config.viewport_height);
        let mut controller = PageListController::with_viewport(source, viewport, initial_request(args)?)
            .with_root_margin(config.root_margin);
        controller.refresh();

        if let Some(y) = args.value_of("scroll") {
            controller.scroll_to(parse_arg("scroll", y)?);
        }

        Ok(Session {
            controller,
            template,
            output,
        })
    }

    fn render(&self) -> Result<()> {
        Writer {
            template: &self.template,
        }
        .write_file(Value::from(&self.controller), &self.output)?;
        info!("wrote {}", self.output.display());
        Ok(())
    }

    fn browse<R: BufRead, W: Write>(&mut self, input: R, mut out: W) -> Result<()> {
        for line in input.lines() {
            let line = line?;
            if line.trim().is_empty() {
                continue;
            }
            let command = match Command::from_str(&line) {
                Ok(command) => command,
                Err(err) => {
                    writeln!(out, "{}", err)?;
                    continue;
                }
            };
            if command == Command::Quit {
                break;
            }
            let outcome = self.apply(&command);
            if let Some(outcome) = outcome {
                writeln!(out, "{:?}", outcome)?;
            }
            if let Command::Show = command {
                self.show(&mut out)?;
            }
            self.render()?;
        }
        Ok(())
    }

    fn apply(&mut self, command: &Command) -> Option<Outcome> {
        let controller = &mut self.controller;
        match *command {
            Command::Size(size) => Some(controller.set_page_size(size)),
            Command::Sort(sort) => Some(controller.set_sort(sort)),
            Command::Page(page) => Some(controller.go_to_page(page)),
            Command::Click(index) => Some(controller.click(index)),
            Command::First => Some(controller.first()),
            Command::Last => Some(controller.last()),
            Command::Scroll(y) => {
                controller.scroll_to(y);
                None
            }
            Command::Show | Command::Quit => None,
        }
    }

    fn show<W: Write>(&self, out: &mut W) -> Result<()> {
        let controller = &self.controller;
        writeln!(out, "{}", controller.request())?;
        if let Some(summary) = controller.summary() {
            writeln!(out, "{}", summary)?;
        }
        for card in controller.cards() {
            writeln!(
                out,
                "  [{}] {}{}",
                card.item.id,
                card.item.title,
                if card.image.is_loaded() { "" } else { " (image pending)" }
            )?;
        }
        for (i, control) in controller.controls().iter().enumerate() {
            let marker = match (control.active, control.is_enabled()) {
                (true, _) => "*",
                (false, true) => " ",
                (false, false) => "-",
            };
            write!(out, "{}{}:{} ", marker, i, control.label)?;
        }
        writeln!(out)?;
        Ok(())
    }
}

fn initial_request(args: &ArgMatches) -> Result<PageRequest> {
    if let Some(location) = args.value_of("location") {
        return Ok(PageRequest::from_location(location));
    }
    let page = match args.value_of("page") {
        Some(page) => parse_arg("page", page)?,
        None => 1,
    };
    let size = match args.value_of("size") {
        Some(size) => PageSize::try_from(parse_arg::<u32>("size", size)?)?,
        None => PageSize::default(),
    };
    let sort = match args.value_of("sort") {
        Some(sort) => SortKey::from_str(sort)?,
        None => SortKey::default(),
    };
    Ok(PageRequest::new(page, size, sort))
}

fn parse_arg<T: FromStr>(name: &str, value: &str) -> Result<T> {
    value
        .parse()
        .map_err(|_| anyhow!("Invalid value for --{}: `{}`", name, value))
}

/// A line of input to `ideas browse`.
#[derive(Debug, PartialEq)]
enum Command {
    Size(u32),
    Sort(SortKey),
    Page(u32),
    Click(usize),
    First,
    Last,
    Scroll(f64),
    Show,
    Quit,
}

impl FromStr for Command {
    type Err = anyhow::Error;

    fn from_str(line: &str) -> Result<Command> {
        let words: Vec<&str> = line.split_whitespace().collect();
        match words.as_slice() {
            ["size", n] => Ok(Command::Size(parse_arg("size", n)?)),
            ["sort", key] => Ok(Command::Sort(SortKey::from_str(key)?)),
            ["page", n] => Ok(Command::Page(parse_arg("page", n)?)),
            ["click", i] => Ok(Command::Click(parse_arg("click", i)?)),
            ["first"] => Ok(Command::First),
            ["last"] => Ok(Command::Last),
            ["scroll", y] => Ok(Command::Scroll(parse_arg("scroll", y)?)),
            ["show"] => Ok(Command::Show),
            ["quit"] | ["exit"] => Ok(Command::Quit),
            _ => Err(anyhow!(
                "Unknown command `{}`; try size N, sort newest|oldest, page N, click I, \
                 first, last, scroll Y, show, quit",
                line.trim()
            )),
        }
    }
}
