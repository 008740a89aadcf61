//! Parsing of the list formats the simulators read from the command line.

use std::str::FromStr;

use ossim_error::{errdata, Error};

use crate::scheduler::Job;
use crate::typedef::Pid;
use crate::Result;

fn tokens(input: &str) -> impl Iterator<Item = &str> {
    input
        .split(|c: char| c == ',' || c.is_whitespace())
        .filter(|token| !token.is_empty())
}

/// Parses a list separated by whitespace and/or commas, e.g. `7 0 1, 2`.
pub fn parse_list<T: FromStr>(input: &str) -> Result<Vec<T>> {
    tokens(input).map(parse_number::<T>).collect()
}

fn parse_number<T: FromStr>(token: &str) -> Result<T> {
    match token.parse::<T>() {
        Ok(value) => Ok(value),
        Err(_) => errdata!("invalid number {token:?}"),
    }
}

/// Parses jobs written as `arrival:burst` or `arrival:burst:priority`.
/// Pids are assigned 1, 2, ... in input order.
pub fn parse_jobs(input: &str) -> Result<Vec<Job>> {
    tokens(input)
        .enumerate()
        .map(|(index, token)| -> Result<Job> {
            let fields: Vec<&str> = token.split(':').collect();
            if !(2..=3).contains(&fields.len()) {
                return errdata!("job {token:?} is not arrival:burst[:priority]");
            }
            let arrival = parse_field(token, fields[0])?;
            let burst = parse_field(token, fields[1])?;
            let priority = match fields.get(2) {
                Some(field) => parse_field(token, field)?,
                None => 0,
            };
            let pid = Pid::try_from(index + 1).map_err(|_| Error::ArithmeticOverflow)?;
            Ok(Job::new(pid, arrival, burst, priority))
        })
        .collect()
}

fn parse_field<T: FromStr>(token: &str, field: &str) -> Result<T> {
    match field.parse::<T>() {
        Ok(value) => Ok(value),
        Err(_) => errdata!("invalid field {field:?} in job {token:?}"),
    }
}
