// src/cli.rs
use crate::core::ConfigManager;
use crate::skill_analysis::MarketAnalysis;
use crate::utils::split_skill_list;
use crate::web::{start_web_server, ServerState};
use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use std::io::Write;
use std::path::PathBuf;
use tracing::info;

#[derive(Parser)]
#[command(name = "jobscout")]
#[command(about = "Skill-gap analysis and job recommendations over a job search index")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Command>,

    /// Read postings from a JSON export instead of the search service
    #[arg(long, global = true)]
    pub jobs_file: Option<PathBuf>,

    /// Read learning resources from a JSON export instead of the CMS
    #[arg(long, global = true)]
    pub resources_file: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Command {
    /// Run the HTTP API (default)
    Serve,
    /// Print a skill-gap analysis for a comma separated skill list
    Analyze {
        #[arg(long)]
        skills: String,
    },
    /// Print skill demand across the job corpus
    Market {
        #[arg(long, value_enum, default_value_t = OutputFormat::Json)]
        format: OutputFormat,
    },
    /// Print job postings ranked by skill coverage
    Recommend {
        #[arg(long)]
        skills: String,
        #[arg(long, default_value_t = 6)]
        limit: usize,
    },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Json,
    Csv,
}

pub async fn handle_command(cli: Cli, config: ConfigManager) -> Result<()> {
    let state = ServerState::from_sources(
        &config,
        cli.jobs_file.as_deref(),
        cli.resources_file.as_deref(),
    )?;

    match cli.command.unwrap_or(Command::Serve) {
        Command::Serve => start_web_server(&config, state).await,

        Command::Analyze { skills } => {
            let skills = split_skill_list(&skills);
            info!("Running skill gap analysis for {} skills", skills.len());
            let analysis = state.analyzer.analyze_skill_gaps(&skills).await;
            print_json(&analysis)
        }

        Command::Market { format } => {
            let market = state.analyzer.market().analyze_job_market().await;
            match format {
                OutputFormat::Json => print_json(&market),
                OutputFormat::Csv => {
                    write_market_csv(&market, std::io::stdout().lock())?;
                    Ok(())
                }
            }
        }

        Command::Recommend { skills, limit } => {
            let skills = split_skill_list(&skills);
            let jobs = state.recommender.recommend_jobs(&skills, limit).await;
            print_json(&jobs)
        }
    }
}

fn print_json<T: serde::Serialize>(value: &T) -> Result<()> {
    let json = serde_json::to_string_pretty(value).context("Failed to serialize output")?;
    println!("{}", json);
    Ok(())
}

/// One `skill,job_count,percentage` row per top skill.
pub fn write_market_csv<W: Write>(market: &MarketAnalysis, writer: W) -> Result<()> {
    let mut csv = csv::Writer::from_writer(writer);
    csv.write_record(["skill", "job_count", "percentage"])?;
    for demand in &market.top_skills {
        csv.write_record([
            demand.skill.clone(),
            demand.job_count.to_string(),
            demand.percentage.to_string(),
        ])?;
    }
    csv.flush().context("Failed to write CSV output")?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::skill_analysis::SkillDemand;

    #[test]
    fn test_market_csv() {
        let market = MarketAnalysis {
            total_jobs: 10,
            top_skills: vec![
                SkillDemand {
                    skill: "react".to_string(),
                    job_count: 4,
                    percentage: 40,
                },
                SkillDemand {
                    skill: "ci/cd, pipelines".to_string(),
                    job_count: 1,
                    percentage: 10,
                },
            ],
            ..Default::default()
        };
        let mut out = Vec::new();
        write_market_csv(&market, &mut out).unwrap();
        assert_eq!(
            String::from_utf8(out).unwrap(),
            "skill,job_count,percentage\nreact,4,40\n\"ci/cd, pipelines\",1,10\n"
        );
    }

    #[test]
    fn test_cli_parsing() {
        let cli = Cli::try_parse_from([
            "jobscout",
            "--jobs-file",
            "jobs.json",
            "recommend",
            "--skills",
            "rust,go",
            "--limit",
            "3",
        ])
        .unwrap();
        assert_eq!(cli.jobs_file, Some(PathBuf::from("jobs.json")));
        assert!(matches!(
            cli.command,
            Some(Command::Recommend { ref skills, limit: 3 }) if skills == "rust,go"
        ));

        let cli = Cli::try_parse_from(["jobscout", "market", "--format", "csv"]).unwrap();
        assert!(matches!(
            cli.command,
            Some(Command::Market { format: OutputFormat::Csv })
        ));

        let cli = Cli::try_parse_from(["jobscout"]).unwrap();
        assert!(cli.command.is_none());
    }
}
