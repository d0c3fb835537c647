//! Interactive prompt session.
//!
//! Each question loops until the answer passes its `selection::parse_*`
//! validator. End of input ends the session quietly.

use std::collections::HashMap;
use std::collections::hash_map::Entry;
use std::io::{BufRead, Write};

use anyhow::Result;
use bikeshare_explorer::analyzers::aggregate;
use bikeshare_explorer::config::Config;
use bikeshare_explorer::dataset::Dataset;
use bikeshare_explorer::error::ExplorerError;
use bikeshare_explorer::filter::filter;
use bikeshare_explorer::output::{render_page, render_report};
use bikeshare_explorer::parser::load_trips;
use bikeshare_explorer::selection::{
    City, FilterSpec, parse_city, parse_day, parse_month, parse_yes_no,
};
use tracing::{error, info};

pub struct Session<R, W> {
    input: R,
    output: W,
    config: Config,
    // parsed, unfiltered datasets reused across restarts
    loaded: HashMap<City, Dataset>,
}

impl<R: BufRead, W: Write> Session<R, W> {
    pub fn new(input: R, output: W, config: Config) -> Self {
        Session {
            input,
            output,
            config,
            loaded: HashMap::new(),
        }
    }

    /// Reads one trimmed line. `None` at end of input.
    fn read_answer(&mut self) -> Result<Option<String>> {
        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            return Ok(None);
        }
        Ok(Some(line.trim().to_string()))
    }

    fn ask<T>(
        &mut self,
        question: &str,
        parse: fn(&str) -> Result<T, ExplorerError>,
    ) -> Result<Option<T>> {
        loop {
            write!(self.output, "{question} ")?;
            self.output.flush()?;

            let Some(answer) = self.read_answer()? else {
                return Ok(None);
            };
            match parse(&answer) {
                Ok(value) => {
                    writeln!(self.output, "input accepted\n")?;
                    return Ok(Some(value));
                }
                Err(e) => writeln!(self.output, "{e}. Please try again.")?,
            }
        }
    }

    fn dataset(&mut self, city: City) -> Result<&Dataset, ExplorerError> {
        match self.loaded.entry(city) {
            Entry::Occupied(entry) => {
                info!(city = %city, "Reusing loaded trips");
                Ok(entry.into_mut())
            }
            Entry::Vacant(entry) => {
                let path = self.config.path_for(city);
                Ok(entry.insert(load_trips(&path)?))
            }
        }
    }

    fn show_raw_rows(&mut self, view: &Dataset) -> Result<bool> {
        let Some(wanted) = self.ask("Would you like to see raw data first? (yes/no)", parse_yes_no)?
        else {
            return Ok(false);
        };
        if !wanted {
            return Ok(true);
        }

        let page_size = self.config.page_size;
        let mut offset = 0;
        loop {
            let page = view.page(offset, page_size);
            if page.is_empty() {
                writeln!(self.output, "No more rows to show.")?;
                break;
            }
            writeln!(self.output, "{}", render_page(offset, page))?;
            offset += page.len();

            write!(
                self.output,
                "Would you like to continue to the next {page_size} lines of raw data? (yes / any other input): "
            )?;
            self.output.flush()?;
            match self.read_answer()? {
                Some(answer) if answer.eq_ignore_ascii_case("yes") => continue,
                Some(_) => break,
                None => return Ok(false),
            }
        }
        Ok(true)
    }

    /// Runs one city/filter query. Returns `false` once input is exhausted.
    fn run_query(&mut self) -> Result<bool> {
        let Some(city) = self.ask(
            "Which city's data would you like to explore? (chicago / new york city / washington):",
            parse_city,
        )?
        else {
            return Ok(false);
        };
        let Some(month) = self.ask(
            "For which month would you like to see data? (\"all\" or a month between january and june):",
            parse_month,
        )?
        else {
            return Ok(false);
        };
        let Some(day) = self.ask(
            "Which day of the week would you like to see? (\"all\" or any day of the week):",
            parse_day,
        )?
        else {
            return Ok(false);
        };
        let spec = FilterSpec::new(month, day);

        let view = match self.dataset(city) {
            Ok(dataset) => filter(dataset, &spec),
            Err(e) => {
                error!(city = %city, error = %e, "Failed to load trips");
                writeln!(self.output, "Could not load data for {city}: {e}")?;
                return Ok(true);
            }
        };

        if !self.show_raw_rows(&view)? {
            return Ok(false);
        }

        let report = aggregate(&view);
        write!(self.output, "{}", render_report(&report))?;
        Ok(true)
    }

    pub fn run(&mut self) -> Result<()> {
        writeln!(self.output, "Hello! Let's explore some US bikeshare data!")?;

        loop {
            if !self.run_query()? {
                break;
            }

            write!(self.output, "\nWould you like to restart? Enter yes or no. ")?;
            self.output.flush()?;
            match self.read_answer()? {
                Some(answer) if answer.eq_ignore_ascii_case("yes") => continue,
                _ => break,
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::path::PathBuf;

    const TRIPS: &str = "\
,Start Time,End Time,Trip Duration,Start Station,End Station,User Type,Gender,Birth Year
1,2017-03-06 08:00:00,2017-03-06 08:10:00,600,A,B,Subscriber,Male,1990
2,2017-03-13 08:00:00,2017-03-13 08:10:00,600,A,B,Subscriber,Female,1985
3,2017-04-04 09:00:00,2017-04-04 09:10:00,600,C,D,Customer,,
";

    fn data_dir(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(name);
        fs::create_dir_all(&dir).unwrap();
        fs::write(dir.join("chicago.csv"), TRIPS).unwrap();
        dir
    }

    fn run(dir: PathBuf, script: &str) -> String {
        let config = Config {
            data_dir: dir,
            page_size: 2,
            ..Config::default()
        };
        let mut out = Vec::new();
        Session::new(script.as_bytes(), &mut out, config)
            .run()
            .unwrap();
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn test_full_query_with_reprompts() {
        let dir = data_dir("bikeshare_explorer_session_full");
        let out = run(dir.clone(), "boston\nChicago\njuly\nmarch\nall\nmaybe\nno\nno\n");

        assert!(out.contains("unrecognised city 'boston'"));
        assert!(out.contains("unrecognised month 'july'"));
        assert!(out.contains("unrecognised answer 'maybe'"));
        assert!(out.contains("Most popular month: March"));
        assert!(out.contains("Most popular day of the week: Monday"));
        assert!(out.contains("Earliest year of birth: 1985"));

        fs::remove_dir_all(dir).unwrap();
    }

    #[test]
    fn test_raw_rows_are_paged() {
        let dir = data_dir("bikeshare_explorer_session_pages");
        let out = run(dir.clone(), "chicago\nall\nall\nyes\nyes\nyes\nno\n");

        assert!(out.contains("2017-03-06 08:00:00"));
        assert!(out.contains("2017-04-04 09:00:00"));
        assert!(out.contains("No more rows to show."));
        assert!(out.contains("Most popular start station: A"));

        fs::remove_dir_all(dir).unwrap();
    }

    #[test]
    fn test_restart_reuses_loaded_city() {
        let dir = data_dir("bikeshare_explorer_session_restart");
        let config = Config {
            data_dir: dir.clone(),
            ..Config::default()
        };
        let script = "chicago\nall\nall\nno\nyes\nchicago\napril\nall\nno\nno\n";
        let mut out = Vec::new();
        let mut session = Session::new(script.as_bytes(), &mut out, config);

        session.run().unwrap();
        assert_eq!(session.loaded.len(), 1);
        assert_eq!(session.loaded[&City::Chicago].len(), 3);
        drop(session);

        let out = String::from_utf8(out).unwrap();
        assert!(out.contains("Most popular month: April"));

        fs::remove_dir_all(dir).unwrap();
    }

    #[test]
    fn test_missing_file_does_not_end_session() {
        let dir = data_dir("bikeshare_explorer_session_missing");
        let out = run(dir.clone(), "washington\nall\nall\nno\n");

        assert!(out.contains("Could not load data for washington"));

        fs::remove_dir_all(dir).unwrap();
    }

    #[test]
    fn test_end_of_input_stops_quietly() {
        let dir = data_dir("bikeshare_explorer_session_eof");
        let out = run(dir.clone(), "chicago\n");
        assert!(!out.contains("Most popular"));

        fs::remove_dir_all(dir).unwrap();
    }
}
