use chrono::{DateTime, Duration, Utc};
use log::{debug, warn};

use aws_config::{BehaviorVersion, Region};
use aws_sdk_glue::error::ProvideErrorMetadata;

use crate::config::AwsAuth;
use crate::error::{Error, Result};
use crate::model::{JobDetail, JobRun, TriggerInfo};

const LIST_PAGE_SIZE: i32 = 100;
const MAX_LIST_PAGES: usize = 50;

/// AWS Glue client bundle: job metadata, script storage, and job metrics.
pub struct GlueProvider {
    glue: aws_sdk_glue::Client,
    s3: aws_sdk_s3::Client,
    cloudwatch: aws_sdk_cloudwatch::Client,
    region: String,
}

impl GlueProvider {
    /// Build AWS clients from the resolved auth settings and verify them
    /// with a one-page ListJobs probe.
    pub async fn connect(auth: &AwsAuth) -> Result<Self> {
        let region = auth.region();
        let mut loader =
            aws_config::defaults(BehaviorVersion::latest()).region(Region::new(region.clone()));

        if auth.has_static_keys() {
            let credentials = aws_sdk_glue::config::Credentials::new(
                auth.access_key_id.clone().unwrap_or_default(),
                auth.secret_access_key.clone().unwrap_or_default(),
                auth.session_token.clone(),
                None,
                "gluescope",
            );
            loader = loader.credentials_provider(credentials);
        } else if let Some(profile) = &auth.profile {
            loader = loader.profile_name(profile);
        }

        let sdk_config = loader.load().await;
        let provider = Self {
            glue: aws_sdk_glue::Client::new(&sdk_config),
            s3: aws_sdk_s3::Client::new(&sdk_config),
            cloudwatch: aws_sdk_cloudwatch::Client::new(&sdk_config),
            region,
        };

        provider.verify_auth().await?;
        Ok(provider)
    }

    pub fn region(&self) -> &str {
        &self.region
    }

    async fn verify_auth(&self) -> Result<()> {
        match self.glue.list_jobs().max_results(1).send().await {
            Ok(resp) => {
                debug!(
                    "authentication probe ok ({} jobs on first page)",
                    resp.job_names().len()
                );
                Ok(())
            }
            Err(err) => {
                let code = err.code().unwrap_or_default().to_string();
                let message = format!("{} ({})", err.into_service_error(), code);
                if matches!(
                    code.as_str(),
                    "AccessDeniedException"
                        | "AccessDenied"
                        | "UnrecognizedClientException"
                        | "InvalidClientTokenId"
                        | "ExpiredTokenException"
                        | "UnauthorizedOperation"
                ) {
                    Err(Error::Auth(message))
                } else {
                    Err(Error::Provider(format!("ListJobs probe failed: {}", message)))
                }
            }
        }
    }

    /// List every Glue job name, following pagination with a safety cap.
    pub async fn list_job_names(&self) -> Result<Vec<String>> {
        let mut names = Vec::new();
        let mut next_token: Option<String> = None;
        let mut pages = 0usize;

        loop {
            pages += 1;
            let resp = self
                .glue
                .list_jobs()
                .max_results(LIST_PAGE_SIZE)
                .set_next_token(next_token.clone())
                .send()
                .await
                .map_err(|e| {
                    Error::Provider(format!("failed to list jobs: {}", e.into_service_error()))
                })?;

            let page = resp.job_names();
            names.extend(page.iter().cloned());
            debug!(
                "list_jobs page {}: {} jobs ({} total)",
                pages,
                page.len(),
                names.len()
            );

            next_token = resp.next_token().map(str::to_string);
            if next_token.is_none() {
                break;
            }
            if pages >= MAX_LIST_PAGES {
                warn!("stopped listing jobs after {} pages", pages);
                break;
            }
        }

        Ok(names)
    }

    /// Fetch a job definition and flatten it into [`JobDetail`].
    pub async fn get_job(&self, job_name: &str) -> Result<JobDetail> {
        let resp = self
            .glue
            .get_job()
            .job_name(job_name)
            .send()
            .await
            .map_err(|e| {
                let e = e.into_service_error();
                if e.is_entity_not_found_exception() {
                    Error::Provider(format!("job '{}' not found", job_name))
                } else {
                    Error::Provider(format!("failed to get job '{}': {}", job_name, e))
                }
            })?;

        let job = resp
            .job()
            .ok_or_else(|| Error::Provider(format!("empty GetJob response for '{}'", job_name)))?;

        Ok(JobDetail {
            name: job.name().unwrap_or(job_name).to_string(),
            description: job.description().map(str::to_string),
            created_on: job.created_on().and_then(to_chrono),
            glue_version: job.glue_version().map(str::to_string),
            worker_type: job.worker_type().map(|w| w.as_str().to_string()),
            number_of_workers: job.number_of_workers(),
            max_capacity: job.max_capacity(),
            timeout_minutes: job.timeout(),
            max_retries: job.max_retries(),
            execution_class: job.execution_class().map(|c| c.as_str().to_string()),
            command_name: job.command().and_then(|c| c.name()).map(str::to_string),
            script_location: job
                .command()
                .and_then(|c| c.script_location())
                .map(str::to_string),
            default_arguments: job.default_arguments().cloned().unwrap_or_default(),
        })
    }

    /// Fetch the most recent runs of a job. A missing job yields an empty
    /// list rather than an error, matching how inventories treat jobs that
    /// were deleted mid-scan.
    pub async fn recent_runs(&self, job_name: &str, max_results: i32) -> Result<Vec<JobRun>> {
        let resp = match self
            .glue
            .get_job_runs()
            .job_name(job_name)
            .max_results(max_results)
            .send()
            .await
        {
            Ok(resp) => resp,
            Err(e) => {
                let e = e.into_service_error();
                if e.is_entity_not_found_exception() {
                    return Ok(Vec::new());
                }
                return Err(Error::Provider(format!(
                    "failed to get runs for '{}': {}",
                    job_name, e
                )));
            }
        };

        Ok(resp
            .job_runs()
            .iter()
            .map(|run| JobRun {
                state: run
                    .job_run_state()
                    .map(|s| s.as_str().to_string())
                    .unwrap_or_else(|| "UNKNOWN".to_string()),
                started_on: run.started_on().and_then(to_chrono),
                completed_on: run.completed_on().and_then(to_chrono),
                execution_seconds: run.execution_time(),
            })
            .collect())
    }

    /// Download a job script from its `s3://bucket/key` location.
    pub async fn download_script(&self, location: &str) -> Result<String> {
        let (bucket, key) = parse_s3_location(location)?;

        let resp = self
            .s3
            .get_object()
            .bucket(&bucket)
            .key(&key)
            .send()
            .await
            .map_err(|e| {
                Error::Provider(format!(
                    "failed to download script {}: {}",
                    location,
                    e.into_service_error()
                ))
            })?;

        let bytes = resp.body.collect().await.map_err(|e| {
            Error::Provider(format!("failed to read script body {}: {}", location, e))
        })?;

        let content = String::from_utf8(bytes.to_vec())
            .map_err(|e| Error::Analysis(format!("script {} is not UTF-8: {}", location, e)))?;
        debug!("downloaded script {} ({} bytes)", location, content.len());
        Ok(content)
    }

    /// Average of a Glue job metric over the trailing window, hourly period.
    pub async fn metric_average(
        &self,
        job_name: &str,
        metric_name: &str,
        days: i64,
    ) -> Result<Option<f64>> {
        let end = Utc::now();
        let start = end - Duration::days(days);

        let resp = self
            .cloudwatch
            .get_metric_statistics()
            .namespace("AWS/Glue")
            .metric_name(metric_name)
            .dimensions(
                aws_sdk_cloudwatch::types::Dimension::builder()
                    .name("JobName")
                    .value(job_name)
                    .build(),
            )
            .start_time(to_smithy(start))
            .end_time(to_smithy(end))
            .period(3600)
            .statistics(aws_sdk_cloudwatch::types::Statistic::Average)
            .send()
            .await
            .map_err(|e| {
                Error::Provider(format!(
                    "failed to get metric {} for '{}': {}",
                    metric_name,
                    job_name,
                    e.into_service_error()
                ))
            })?;

        let datapoints = resp.datapoints();
        let averages: Vec<f64> = datapoints.iter().filter_map(|d| d.average()).collect();
        if averages.is_empty() {
            return Ok(None);
        }
        Ok(Some(averages.iter().sum::<f64>() / averages.len() as f64))
    }

    /// List all triggers, reduced to the fields dependency analysis uses.
    pub async fn list_triggers(&self) -> Result<Vec<TriggerInfo>> {
        let mut triggers = Vec::new();
        let mut next_token: Option<String> = None;
        let mut pages = 0usize;

        loop {
            pages += 1;
            let resp = self
                .glue
                .get_triggers()
                .set_next_token(next_token.clone())
                .send()
                .await
                .map_err(|e| {
                    Error::Provider(format!(
                        "failed to list triggers: {}",
                        e.into_service_error()
                    ))
                })?;

            for trigger in resp.triggers() {
                let action_jobs: Vec<String> = trigger
                    .actions()
                    .iter()
                    .filter_map(|a| a.job_name())
                    .map(str::to_string)
                    .collect();

                let upstream_jobs: Vec<String> = trigger
                    .predicate()
                    .map(|p| {
                        p.conditions()
                            .iter()
                            .filter(|c| {
                                c.logical_operator()
                                    .map(|op| op.as_str() == "EQUALS")
                                    .unwrap_or(false)
                            })
                            .filter_map(|c| c.job_name())
                            .map(str::to_string)
                            .collect()
                    })
                    .unwrap_or_default();

                triggers.push(TriggerInfo {
                    name: trigger.name().unwrap_or_default().to_string(),
                    schedule: trigger.schedule().map(str::to_string),
                    action_jobs,
                    upstream_jobs,
                });
            }

            next_token = resp.next_token().map(str::to_string);
            if next_token.is_none() || pages >= MAX_LIST_PAGES {
                break;
            }
        }

        Ok(triggers)
    }
}

/// Split an `s3://bucket/key` URI into bucket and key.
pub fn parse_s3_location(location: &str) -> Result<(String, String)> {
    let rest = location
        .strip_prefix("s3://")
        .or_else(|| location.strip_prefix("s3a://"))
        .ok_or_else(|| Error::Config(format!("not an S3 location: {}", location)))?;

    match rest.split_once('/') {
        Some((bucket, key)) if !bucket.is_empty() && !key.is_empty() => {
            Ok((bucket.to_string(), key.to_string()))
        }
        _ => Err(Error::Config(format!(
            "S3 location missing bucket or key: {}",
            location
        ))),
    }
}

fn to_chrono(dt: &aws_smithy_types::DateTime) -> Option<DateTime<Utc>> {
    DateTime::from_timestamp(dt.secs(), dt.subsec_nanos())
}

fn to_smithy(dt: DateTime<Utc>) -> aws_smithy_types::DateTime {
    aws_smithy_types::DateTime::from_secs(dt.timestamp())
}
