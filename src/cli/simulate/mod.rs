// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Simulate delay-corrupted visibilities, initialise a gain term from them and
//! write out the result.

#[cfg(test)]
mod tests;

use std::{
    fs::File,
    io::{BufWriter, Write},
    path::PathBuf,
};

use clap::Parser;
use hifitime::{Duration, Epoch};
use itertools::Itertools;
use log::{debug, info};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::common::{ArgFileTypes, ARG_FILE_HELP, ARG_FILE_TYPES_COMMA_SEPARATED};
use crate::{
    context::CorrelationMap,
    terms::{ChunkLayout, GainTerm, InitInputs, Term, TermOptions, TermParams, TermSolutions},
    vis_simulate::{simulate_delays, SimulationParams},
    DelayCalError,
};

const DEFAULT_OUTPUT_FILENAME: &str = "delaycal_solutions.json";
const DEFAULT_NUM_CHANNELS: usize = 64;
const DEFAULT_FREQ_RES_KHZ: f64 = 1000.0;
const DEFAULT_FIRST_FREQ_MHZ: f64 = 150.0;
const DEFAULT_NUM_TIMESTEPS: usize = 1;
const DEFAULT_TIME_RES_SECONDS: f64 = 8.0;
const DEFAULT_START_GPS_SECONDS: f64 = 1090008640.0;
const DEFAULT_CORRELATIONS: [&str; 4] = ["XX", "XY", "YX", "YY"];

lazy_static::lazy_static! {
    static ref NUM_CHANNELS_HELP: String =
        format!("The number of channels. Default: {DEFAULT_NUM_CHANNELS}");

    static ref FREQ_RES_HELP: String =
        format!("The channel resolution [kHz]. Default: {DEFAULT_FREQ_RES_KHZ}");

    static ref FIRST_FREQ_HELP: String =
        format!("The centre frequency of the first channel [MHz]. Default: {DEFAULT_FIRST_FREQ_MHZ}");

    static ref NUM_TIMESTEPS_HELP: String =
        format!("The number of timesteps. Default: {DEFAULT_NUM_TIMESTEPS}");

    static ref TIME_RES_HELP: String =
        format!("The time resolution [seconds]. Default: {DEFAULT_TIME_RES_SECONDS}");

    static ref CORRELATIONS_HELP: String =
        format!("The correlations of the visibilities, in order. Default: {}", DEFAULT_CORRELATIONS.join(" "));

    static ref OUTPUT_HELP: String =
        format!("Path to the output solutions. Supported formats: {}. Default: {DEFAULT_OUTPUT_FILENAME}", *ARG_FILE_TYPES_COMMA_SEPARATED);
}

#[derive(Error, Debug)]
pub(super) enum SimulateArgsError {
    #[error("No antenna delays were supplied")]
    NoDelays,

    #[error("Reference antenna {ref_ant} is out of range; there are only {num_ants} antennas")]
    RefAnt { ref_ant: usize, num_ants: usize },

    #[error("Output file '{0}' doesn't have a recognised extension. Supported formats: {}", *ARG_FILE_TYPES_COMMA_SEPARATED)]
    OutputExtension(PathBuf),
}

#[derive(Parser, Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub(super) struct SimulateCliArgs {
    /// The delay of each antenna [ns]. The number of delays is the number of
    /// antennas.
    #[clap(short, long, multiple_values(true), help_heading = "SIMULATION")]
    pub(super) delays: Option<Vec<f64>>,

    #[clap(short = 'c', long, help = NUM_CHANNELS_HELP.as_str(), help_heading = "SIMULATION")]
    pub(super) num_channels: Option<usize>,

    #[clap(short, long, help = FREQ_RES_HELP.as_str(), help_heading = "SIMULATION")]
    pub(super) freq_res: Option<f64>,

    #[clap(long, help = FIRST_FREQ_HELP.as_str(), help_heading = "SIMULATION")]
    pub(super) first_freq: Option<f64>,

    #[clap(short = 't', long, help = NUM_TIMESTEPS_HELP.as_str(), help_heading = "SIMULATION")]
    pub(super) num_timesteps: Option<usize>,

    #[clap(long, help = TIME_RES_HELP.as_str(), help_heading = "SIMULATION")]
    pub(super) time_res: Option<f64>,

    #[clap(long, multiple_values(true), help = CORRELATIONS_HELP.as_str(), help_heading = "SIMULATION")]
    pub(super) correlations: Option<Vec<String>>,

    /// Include auto-correlations. They don't contribute to delay estimates.
    #[clap(long, help_heading = "SIMULATION")]
    #[serde(default)]
    pub(super) autos: bool,

    /// The antenna that delays are referenced to. Default: 0
    #[clap(short, long, help_heading = "CALIBRATION")]
    pub(super) ref_ant: Option<usize>,

    #[clap(short, long, help = OUTPUT_HELP.as_str(), help_heading = "OUTPUT FILES")]
    pub(super) output: Option<PathBuf>,
}

impl SimulateCliArgs {
    fn merge(self, other: Self) -> Self {
        Self {
            delays: self.delays.or(other.delays),
            num_channels: self.num_channels.or(other.num_channels),
            freq_res: self.freq_res.or(other.freq_res),
            first_freq: self.first_freq.or(other.first_freq),
            num_timesteps: self.num_timesteps.or(other.num_timesteps),
            time_res: self.time_res.or(other.time_res),
            correlations: self.correlations.or(other.correlations),
            autos: self.autos || other.autos,
            ref_ant: self.ref_ant.or(other.ref_ant),
            output: self.output.or(other.output),
        }
    }
}

#[derive(Parser, Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SimulateArgs {
    #[clap(name = "ARGUMENTS_FILE", help = ARG_FILE_HELP.as_str(), parse(from_os_str))]
    #[serde(skip)]
    pub(super) args_file: Option<PathBuf>,

    #[clap(flatten)]
    #[serde(rename = "simulate")]
    #[serde(default)]
    pub(super) simulate_args: SimulateCliArgs,

    #[clap(flatten)]
    #[serde(rename = "term")]
    #[serde(default)]
    pub(super) term_args: TermOptions,
}

/// Everything needed to run a simulation.
#[derive(Debug)]
pub(super) struct SimulateParams {
    pub(super) sim: SimulationParams,
    pub(super) corr_map: CorrelationMap,
    pub(super) term_params: TermParams,
    pub(super) ref_ant: usize,
    pub(super) output: PathBuf,
    pub(super) output_type: ArgFileTypes,
}

impl SimulateArgs {
    /// Both command-line and file arguments overlap in terms of what is
    /// available; this function consolidates everything that was specified into
    /// a single struct. Where applicable, it will prefer CLI parameters over
    /// those in the file.
    ///
    /// This function should only ever merge arguments, and not try to make
    /// sense of them.
    pub(super) fn merge(self) -> Result<SimulateArgs, DelayCalError> {
        debug!("Merging command-line arguments with the argument file");

        let cli_args = self;

        if let Some(arg_file) = cli_args.args_file {
            // Ensure all of the file args are accounted for by pattern
            // matching.
            let SimulateArgs {
                args_file: _,
                simulate_args,
                term_args,
            } = unpack_arg_file!(arg_file);

            Ok(SimulateArgs {
                args_file: None,
                simulate_args: cli_args.simulate_args.merge(simulate_args),
                term_args: cli_args.term_args.merge(term_args),
            })
        } else {
            Ok(cli_args)
        }
    }

    pub(super) fn parse(self) -> Result<SimulateParams, DelayCalError> {
        debug!("{:#?}", self);

        let SimulateArgs {
            args_file: _,
            simulate_args:
                SimulateCliArgs {
                    delays,
                    num_channels,
                    freq_res,
                    first_freq,
                    num_timesteps,
                    time_res,
                    correlations,
                    autos,
                    ref_ant,
                    output,
                },
            term_args,
        } = self;

        let delays: Vec<f64> = match delays {
            Some(d) if !d.is_empty() => d.into_iter().map(|d| d * 1e-9).collect(),
            _ => return Err(SimulateArgsError::NoDelays.into()),
        };
        let num_ants = delays.len();
        let ref_ant = ref_ant.unwrap_or(0);
        if ref_ant >= num_ants {
            return Err(SimulateArgsError::RefAnt { ref_ant, num_ants }.into());
        }

        let corr_map = match correlations {
            Some(c) => CorrelationMap::from_labels(&c)?,
            None => CorrelationMap::from_labels(&DEFAULT_CORRELATIONS)?,
        };

        let output = output.unwrap_or_else(|| PathBuf::from(DEFAULT_OUTPUT_FILENAME));
        let output_type = ArgFileTypes::from_path(&output)
            .ok_or_else(|| SimulateArgsError::OutputExtension(output.clone()))?;

        let sim = SimulationParams {
            delays,
            num_chans: num_channels.unwrap_or(DEFAULT_NUM_CHANNELS),
            first_freq: first_freq.unwrap_or(DEFAULT_FIRST_FREQ_MHZ) * 1e6,
            freq_res: freq_res.unwrap_or(DEFAULT_FREQ_RES_KHZ) * 1e3,
            num_timesteps: num_timesteps.unwrap_or(DEFAULT_NUM_TIMESTEPS),
            first_timestamp: Epoch::from_gpst_seconds(DEFAULT_START_GPS_SECONDS),
            time_res: Duration::from_seconds(time_res.unwrap_or(DEFAULT_TIME_RES_SECONDS)),
            include_autos: autos,
        };

        Ok(SimulateParams {
            sim,
            corr_map,
            term_params: term_args.parse()?,
            ref_ant,
            output,
            output_type,
        })
    }

    pub(super) fn run(self, dry_run: bool) -> Result<(), DelayCalError> {
        let params = self.parse()?;
        info!(
            "Simulating {} antennas, {} channels of {} kHz from {} MHz, {} timesteps",
            params.sim.delays.len(),
            params.sim.num_chans,
            params.sim.freq_res / 1e3,
            params.sim.first_freq / 1e6,
            params.sim.num_timesteps
        );
        info!(
            "Correlations: {}",
            params.corr_map.correlations().iter().join(" ")
        );
        info!("Reference antenna: {}", params.ref_ant);
        info!("Output: {}", params.output.display());
        if dry_run {
            info!("Dry run -- exiting now.");
            return Ok(());
        }

        let solutions = params.run()?;
        params.write(&solutions)?;
        Ok(())
    }
}

impl SimulateParams {
    /// Simulate the visibilities and initialise a gain term with them.
    pub(super) fn run(&self) -> Result<TermSolutions, DelayCalError> {
        let vis = simulate_delays(&self.sim, &self.corr_map)?;
        let term = Term::new("G", self.term_params);
        let time_map = term.build_time_map(&vis.timestamps, vis.time_res);
        let freq_map = term.build_frequency_map(&vis.chan_freqs, &vis.chan_widths);
        let layout = ChunkLayout {
            corr_map: &self.corr_map,
            time_map: &time_map,
            freq_map: &freq_map,
            chan_freqs: &vis.chan_freqs,
            num_ants: vis.num_ants,
            num_dirs: 1,
        };
        let inputs = InitInputs {
            data: vis.data.view(),
            flags: vis.flags.view(),
            ant1: &vis.ant1,
            ant2: &vis.ant2,
            time_bins: &time_map.row_to_bin,
            chan_freqs: &vis.chan_freqs,
            ref_ant: self.ref_ant,
        };

        let solutions = term.build_result_container(&layout);
        let solutions = term.initialise(solutions, &layout, &inputs, None)?;
        info!(
            "Term '{}' ({}) initialised: {:?}",
            solutions.name, solutions.kind, solutions.state
        );
        self.display_delays(&solutions);
        Ok(solutions)
    }

    /// Log the estimated delays of the first time and frequency bins next to
    /// the simulated delays.
    fn display_delays(&self, solutions: &TermSolutions) {
        let param_corrs = self.corr_map.parameterised();
        if solutions.params.is_empty() || param_corrs.is_empty() {
            return;
        }
        let ref_delay = self.sim.delays[self.ref_ant];
        info!(
            "Antenna  true [ns]  {}",
            param_corrs
                .iter()
                .map(|p| format!("delay_{} [ns]", p.corr))
                .join("  ")
        );
        for (i_ant, &delay) in self.sim.delays.iter().enumerate() {
            let estimates = param_corrs
                .iter()
                .map(|p| format!("{:>13.3}", solutions.params[(0, 0, i_ant, 0, p.delay_slot)] * 1e9))
                .join("  ");
            info!(
                "{i_ant:>7}  {:>9.3}  {estimates}",
                (delay - ref_delay) * 1e9
            );
        }
    }

    pub(super) fn write(&self, solutions: &TermSolutions) -> Result<(), DelayCalError> {
        let mut f = BufWriter::new(File::create(&self.output)?);
        match self.output_type {
            ArgFileTypes::Json => serde_json::to_writer_pretty(&mut f, solutions)?,
            ArgFileTypes::Toml => f.write_all(toml::to_string(solutions)?.as_bytes())?,
        }
        f.flush()?;
        info!("Wrote {}", self.output.display());
        Ok(())
    }
}
