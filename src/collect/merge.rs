use crate::collect::model::{SCRAPE_CONFIGS, entry_job_name};
use crate::collect::{CollectionConfigDocument, JobSpec};
use crate::error::CoreError;
use serde_yaml::Value;
use tracing::{info, warn};

/// Return `doc` with `job` written into its scrape configs.
///
/// An entry with the same job name is replaced where it stands, labels and
/// all; a new name is appended. Nothing is changed when `job` is invalid.
pub fn merge_job(
    doc: &CollectionConfigDocument,
    job: &JobSpec,
) -> Result<CollectionConfigDocument, CoreError> {
    job.validate()?;

    let entry = serde_yaml::to_value(job.to_scrape_job())?;
    let mut entries: Vec<Value> = doc.scrape_configs()?.to_vec();

    let mut matches = entries
        .iter()
        .enumerate()
        .filter(|(_, e)| entry_job_name(e) == Some(job.name.as_str()))
        .map(|(i, _)| i);

    match matches.next() {
        Some(first) => {
            let extra: Vec<usize> = matches.collect();
            entries[first] = entry;
            if !extra.is_empty() {
                warn!(
                    "dropping {} duplicate entries for job '{}'",
                    extra.len(),
                    job.name
                );
                for i in extra.into_iter().rev() {
                    entries.remove(i);
                }
            }
            info!("replaced job '{}' ({})", job.name, job.path_pattern);
        }
        None => {
            entries.push(entry);
            info!("added job '{}' ({})", job.name, job.path_pattern);
        }
    }

    let mut root = doc.clone().into_mapping();
    root.insert(Value::from(SCRAPE_CONFIGS), Value::Sequence(entries));
    Ok(CollectionConfigDocument::from_mapping_unchecked(root))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::labels::Labels;
    use pretty_assertions::assert_eq;

    const BASE: &str = r#"server:
  http_listen_port: 9080
positions:
  filename: /tmp/positions.yaml
scrape_configs:
  - job_name: system
    static_configs:
      - targets: [localhost]
        labels:
          job: varlogs
          __path__: /var/log/*.log
  - job_name: api_logs
    static_configs:
      - targets: [localhost]
        labels:
          job: api_logs
          team: old
          __path__: /old/*.log
  - job_name: worker
    static_configs: []
"#;

    fn labels(pairs: &[(&str, &str)]) -> Labels {
        pairs.iter().copied().collect()
    }

    fn label_pairs(doc: &CollectionConfigDocument, index: usize) -> Vec<(String, String)> {
        let entries = doc.scrape_configs().unwrap();
        let Value::Mapping(m) = &entries[index]["static_configs"][0]["labels"] else {
            panic!("labels is not a mapping");
        };
        m.iter()
            .map(|(k, v)| {
                (
                    k.as_str().unwrap().to_string(),
                    v.as_str().unwrap().to_string(),
                )
            })
            .collect()
    }

    #[test]
    fn adds_job_to_empty_document() {
        let job = JobSpec::new("api_logs", "/var/log/api/*.log", labels(&[("env", "prod")]));
        let doc = merge_job(&CollectionConfigDocument::empty(), &job).unwrap();

        assert_eq!(doc.job_names(), vec!["api_logs".to_string()]);
        assert_eq!(
            label_pairs(&doc, 0),
            vec![
                ("job".to_string(), "api_logs".to_string()),
                ("env".to_string(), "prod".to_string()),
                ("__path__".to_string(), "/var/log/api/*.log".to_string()),
            ]
        );
        assert_eq!(doc.job_paths("api_logs"), vec!["/var/log/api/*.log".to_string()]);
        assert_eq!(
            doc.scrape_configs().unwrap()[0]["static_configs"][0]["targets"][0],
            Value::from("localhost")
        );
    }

    #[test]
    fn existing_job_is_replaced_in_place() {
        let base = CollectionConfigDocument::from_yaml_str(BASE).unwrap();
        let job = JobSpec::new("api_logs", "/new/*.log", labels(&[("env", "prod")]));
        let doc = merge_job(&base, &job).unwrap();

        assert_eq!(
            doc.job_names(),
            vec!["system".to_string(), "api_logs".to_string(), "worker".to_string()]
        );
        // Whole label set replaced: `team` is gone.
        assert_eq!(
            label_pairs(&doc, 1),
            vec![
                ("job".to_string(), "api_logs".to_string()),
                ("env".to_string(), "prod".to_string()),
                ("__path__".to_string(), "/new/*.log".to_string()),
            ]
        );
        assert_eq!(doc.scrape_configs().unwrap()[0], base.scrape_configs().unwrap()[0]);
        assert_eq!(doc.scrape_configs().unwrap()[2], base.scrape_configs().unwrap()[2]);
    }

    #[test]
    fn new_job_is_appended_and_other_keys_survive() {
        let base = CollectionConfigDocument::from_yaml_str(BASE).unwrap();
        let doc = merge_job(&base, &JobSpec::new("nginx", "/var/log/nginx/*.log", Labels::new()))
            .unwrap();

        assert_eq!(doc.job_names().last().map(String::as_str), Some("nginx"));
        assert_eq!(doc.job_names().len(), 4);

        let keys: Vec<&str> = doc
            .as_mapping()
            .keys()
            .map(|k| k.as_str().unwrap())
            .collect();
        assert_eq!(keys, vec!["server", "positions", "scrape_configs"]);
        assert_eq!(doc.as_mapping()["server"], base.as_mapping()["server"]);
    }

    #[test]
    fn merging_twice_is_idempotent() {
        let base = CollectionConfigDocument::from_yaml_str(BASE).unwrap();
        let job = JobSpec::new("nginx", "/var/log/nginx/*.log", labels(&[("env", "dev")]));

        let once = merge_job(&base, &job).unwrap();
        let twice = merge_job(&once, &job).unwrap();
        assert_eq!(once, twice);
        assert_eq!(once.to_yaml_string().unwrap(), twice.to_yaml_string().unwrap());
    }

    #[test]
    fn invalid_job_leaves_document_alone() {
        let base = CollectionConfigDocument::from_yaml_str(BASE).unwrap();
        let before = base.clone();

        assert!(matches!(
            merge_job(&base, &JobSpec::new("", "/x/*.log", Labels::new())),
            Err(CoreError::EmptyJobName)
        ));
        assert!(matches!(
            merge_job(&base, &JobSpec::new("x", "", Labels::new())),
            Err(CoreError::EmptyPathPattern(_))
        ));
        assert_eq!(base, before);
    }

    #[test]
    fn duplicate_entries_collapse_to_one() {
        let text = "scrape_configs:\n  - job_name: a\n  - job_name: b\n  - job_name: a\n";
        let base = CollectionConfigDocument::from_yaml_str(text).unwrap();
        let doc = merge_job(&base, &JobSpec::new("a", "/a/*.log", Labels::new())).unwrap();
        assert_eq!(doc.job_names(), vec!["a".to_string(), "b".to_string()]);
        assert_eq!(doc.job_paths("a"), vec!["/a/*.log".to_string()]);
    }

    #[test]
    fn yaml_output_round_trips() {
        let job = JobSpec::new("api_logs", "/var/log/api/*.log", labels(&[("env", "prod")]));
        let doc = merge_job(&CollectionConfigDocument::empty(), &job).unwrap();
        let text = doc.to_yaml_string().unwrap();
        let back = CollectionConfigDocument::from_yaml_str(&text).unwrap();
        assert_eq!(back, doc);
        assert_eq!(back.job_paths("api_logs"), vec!["/var/log/api/*.log".to_string()]);
    }
}
