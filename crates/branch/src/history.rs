use crate::branch::DATE_FORMAT;
use crate::{BranchError, BranchRegistry, Result};
use chrono::{Local, NaiveDateTime, TimeZone};
use symsync_symbols::{history_log_path, Build};

const HISTORY_FIELDS: usize = 8;
const HISTORY_DATE_FORMAT: &str = "%m/%d/%Y %H:%M:%S";

/// Parses one history record:
///
/// ```text
///          0   1    2          3        4           5            6                   7
/// 0000000001,add,file,07/04/2017,14:44:14,"UDPv6.5U2","4175.2-538","2017/7/4_14:44:14",
/// ```
///
/// Returns `None` for records with fewer than eight fields. An unparseable
/// date is kept verbatim.
pub fn parse_history_line(line: &str) -> Option<Build> {
    let fields: Vec<&str> = line.split(',').collect();
    if fields.len() < HISTORY_FIELDS {
        return None;
    }

    let raw_date = format!("{} {}", fields[3], fields[4]);
    let date = match NaiveDateTime::parse_from_str(&raw_date, HISTORY_DATE_FORMAT) {
        Ok(naive) => match Local.from_local_datetime(&naive).earliest() {
            Some(local) => local.format(DATE_FORMAT).to_string(),
            None => raw_date,
        },
        Err(err) => {
            log::warn!("Parse date {raw_date:?} failed: {err}");
            raw_date
        }
    };

    Some(Build {
        id: fields[0].to_string(),
        date,
        branch: unquote(fields[5]).to_string(),
        version: unquote(fields[6]).to_string(),
        comment: unquote(fields[7]).to_string(),
    })
}

pub(crate) fn unquote(field: &str) -> &str {
    field.trim_matches('"')
}

impl BranchRegistry {
    /// Loads the build history and hands every build to `handler` in
    /// chronological order.
    ///
    /// When builds are already in memory the log is not read again; the
    /// registry is replayed in id order instead. Malformed records are
    /// skipped. The returned count includes the build a failing handler
    /// rejected; the failure comes back as [`BranchError::Interrupted`].
    pub async fn parse_builds<F>(&self, mut handler: F) -> Result<usize>
    where
        F: FnMut(&Build) -> Result<()>,
    {
        if self.has_builds() {
            let mut total = 0;
            for build in self.builds() {
                total += 1;
                if let Err(err) = handler(&build) {
                    log::error!("Handle build {} failed: {err}", build.id);
                    return Err(BranchError::interrupted(total, err));
                }
            }
            return Ok(total);
        }

        let paths = self.paths()?;
        let path = history_log_path(&paths.store);
        let bytes = tokio::fs::read(&path).await.map_err(|err| {
            log::error!("Open build history {} failed: {err}", path.display());
            BranchError::from(err)
        })?;
        let text = String::from_utf8_lossy(&bytes);

        // The log is authoritative: re-derive the count, never shrinking it.
        let previous = self.with_builds_count(std::mem::take);
        let result = self.replay_history(&text, &mut handler);
        self.with_builds_count(|count| *count = (*count).max(previous));
        result
    }

    fn replay_history<F>(&self, text: &str, handler: &mut F) -> Result<usize>
    where
        F: FnMut(&Build) -> Result<()>,
    {
        let mut total = 0;
        for line in text.lines() {
            if line.trim().is_empty() {
                continue;
            }
            let Some(build) = parse_history_line(line) else {
                log::warn!("Invalid line ({line}) in build history of {}", self.name());
                continue;
            };

            total += 1;
            self.commit_build(build.clone());
            if let Err(err) = handler(&build) {
                return Err(BranchError::interrupted(total, err));
            }
        }
        Ok(total)
    }
}
