//! Project-funding applications
//!
//! Submission of a project-support application with its team members, plus
//! the admin triage operations. A failed member insert compensates by
//! deleting the application row so no headless application survives.

use chrono::Utc;
use serde::Serialize;
use tracing::{error, info};
use uuid::Uuid;

use crate::error::{Error, Result};
use crate::store::{
    ApplicationStatus, ApplicationStore, FundingMember, NewApplication, NewFundingMember,
    ProjectApplication,
};

/// One team member on an application form.
#[derive(Debug, Clone)]
pub struct FundingMemberInput {
    pub name: String,
    pub phone: String,
    pub email: Option<String>,
    pub role: Option<String>,
}

/// A complete application submission.
#[derive(Debug, Clone)]
pub struct ApplicationSubmission {
    pub team_name: String,
    pub project_name: String,
    pub project_description: String,
    pub problem_statement: String,
    pub traction_mvp: bool,
    pub traction_pilot: bool,
    pub traction_sales: bool,
    pub traction_links: String,
    pub traction_details: String,
    pub video_pitch: String,
    pub demo_link: String,
    pub support_needs: String,
    pub expected_growth: String,
    pub team_members: Vec<FundingMemberInput>,
}

/// An application together with its team members.
#[derive(Debug, Clone, Serialize)]
pub struct ApplicationWithMembers {
    #[serde(flatten)]
    pub application: ProjectApplication,
    pub team_members: Vec<FundingMember>,
}

/// Submit a new application. Starts in `Pending` status; if the team-member
/// insert fails, the application row is rolled back and the submission fails
/// as a whole.
pub async fn submit_application<S>(
    store: &S,
    submission: ApplicationSubmission,
) -> Result<ProjectApplication>
where
    S: ApplicationStore + ?Sized,
{
    let record = store
        .insert_application(NewApplication {
            team_name: submission.team_name,
            project_name: submission.project_name,
            project_description: submission.project_description,
            problem_statement: submission.problem_statement,
            traction_mvp: submission.traction_mvp,
            traction_pilot: submission.traction_pilot,
            traction_sales: submission.traction_sales,
            traction_links: submission.traction_links,
            traction_details: submission.traction_details,
            video_pitch: submission.video_pitch,
            demo_link: submission.demo_link,
            support_needs: submission.support_needs,
            expected_growth: submission.expected_growth,
            status: ApplicationStatus::Pending,
            created_at: Utc::now(),
        })
        .await
        .map_err(|err| {
            error!(%err, "application insert failed");
            Error::Registration("فشل في تقديم الطلب. حاول مرة أخرى.".into())
        })?;

    if !submission.team_members.is_empty() {
        let rows: Vec<NewFundingMember> = submission
            .team_members
            .into_iter()
            .map(|member| NewFundingMember {
                application_id: record.id,
                name: member.name,
                phone: member.phone,
                email: member.email.unwrap_or_default(),
                role: member.role.unwrap_or_default(),
            })
            .collect();

        if let Err(err) = store.insert_funding_members(rows).await {
            error!(application = %record.id, %err, "team member insert failed");
            if let Err(rollback_err) = store.delete_application(record.id).await {
                error!(
                    application = %record.id,
                    %rollback_err,
                    "failed to roll back application after member insert failure"
                );
            }
            return Err(Error::Registration(
                "فشل في تسجيل أعضاء الفريق. حاول مرة أخرى.".into(),
            ));
        }
    }

    info!(application = %record.id, project = %record.project_name, "application submitted");
    Ok(record)
}

/// All applications, newest first.
pub async fn list_applications<S>(store: &S) -> Result<Vec<ProjectApplication>>
where
    S: ApplicationStore + ?Sized,
{
    Ok(store.query_applications().await?)
}

/// One application with its team members.
pub async fn application_with_members<S>(store: &S, id: Uuid) -> Result<ApplicationWithMembers>
where
    S: ApplicationStore + ?Sized,
{
    let application = store.get_application(id).await?;
    let team_members = store.query_funding_members(id).await?;
    Ok(ApplicationWithMembers {
        application,
        team_members,
    })
}

/// Triage: move an application to a new status.
pub async fn set_application_status<S>(
    store: &S,
    id: Uuid,
    status: ApplicationStatus,
) -> Result<ProjectApplication>
where
    S: ApplicationStore + ?Sized,
{
    Ok(store.update_application_status(id, status).await?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;

    fn submission(members: Vec<FundingMemberInput>) -> ApplicationSubmission {
        ApplicationSubmission {
            team_name: "فريق النور".into(),
            project_name: "Smart Irrigation".into(),
            project_description: "Water-saving irrigation controller".into(),
            problem_statement: "Farms overwater crops".into(),
            traction_mvp: true,
            traction_pilot: false,
            traction_sales: false,
            traction_links: String::new(),
            traction_details: String::new(),
            video_pitch: String::new(),
            demo_link: String::new(),
            support_needs: "Funding for hardware".into(),
            expected_growth: "10 farms in year one".into(),
            team_members: members,
        }
    }

    fn member(name: &str) -> FundingMemberInput {
        FundingMemberInput {
            name: name.into(),
            phone: "01012345678".into(),
            email: None,
            role: Some("developer".into()),
        }
    }

    #[tokio::test]
    async fn submits_application_with_members() {
        let store = MemoryStore::new();
        let record = submit_application(&store, submission(vec![member("Sara"), member("Ali")]))
            .await
            .unwrap();
        assert_eq!(record.status, ApplicationStatus::Pending);

        let full = application_with_members(&store, record.id).await.unwrap();
        assert_eq!(full.team_members.len(), 2);
        assert!(full.team_members.iter().all(|m| m.application_id == record.id));
    }

    #[tokio::test]
    async fn member_insert_failure_rolls_back_the_application() {
        let store = MemoryStore::new();
        store.fail_funding_member_inserts(true);
        let err = submit_application(&store, submission(vec![member("Sara")]))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Registration(_)));
        assert!(list_applications(&store).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn status_update_is_returned() {
        let store = MemoryStore::new();
        let record = submit_application(&store, submission(Vec::new())).await.unwrap();
        let updated = set_application_status(&store, record.id, ApplicationStatus::Accepted)
            .await
            .unwrap();
        assert_eq!(updated.status, ApplicationStatus::Accepted);
    }
}
