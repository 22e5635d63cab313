use super::commit::{ApprovalCommitter, ApprovalRequest, CommitReceipt, NoopApprovalCommitter};
use super::session::{FlowSession, FlowSessionStore};
use super::states::FlowState;
use crate::aggregation::{AgentAggregator, AggregationSettings, PendingTaskAggregator};
use crate::error::ApprovalResult;
use crate::forms::{DecodedSubmission, FormFields, TaskKey};
use crate::selection::{Selection, SelectionPredicateBuilder};
use crate::store::TaskStore;
use crate::view::{AgentSelectionView, PendingPackagesView};
use chrono::Utc;
use serde::Serialize;
use std::collections::{BTreeSet, HashSet};
use std::sync::Arc;
use tracing::{debug, info, warn};
use uuid::Uuid;

/// Control flags of a submitted form
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SubmissionFlags {
    pub filter_agents_first: bool,
    pub filter_agents: bool,
}

impl From<&DecodedSubmission> for SubmissionFlags {
    fn from(decoded: &DecodedSubmission) -> Self {
        Self {
            filter_agents_first: decoded.filter_agents_first,
            filter_agents: decoded.filter_agents,
        }
    }
}

/// Outcome of one round of the workflow
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct FlowTransition {
    pub from: FlowState,
    pub to: FlowState,
    /// The round produced the final approval request
    pub complete: bool,
    /// The agent list belongs in this round's form
    pub show_agents: bool,
    /// Agent narrowing stays requested for the next round
    pub filter_agents: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct FlowResponse {
    pub token: Uuid,
    pub transition: FlowTransition,
    pub packages: PendingPackagesView,
    pub agents: Option<AgentSelectionView>,
    pub selection: Selection,
    pub approval: Option<ApprovalRequest>,
    pub receipt: Option<CommitReceipt>,
}

impl FlowResponse {
    pub fn state(&self) -> FlowState {
        self.transition.to
    }

    /// False for intermediate rounds that only re-render the form
    pub fn is_complete(&self) -> bool {
        self.transition.complete
    }
}

/// Drives the select-packages, optionally-narrow-agents, submit workflow
pub struct SelectionFlowController {
    store: Arc<dyn TaskStore>,
    sessions: Arc<dyn FlowSessionStore>,
    committer: Arc<dyn ApprovalCommitter>,
    settings: AggregationSettings,
}

impl SelectionFlowController {
    pub fn new(
        store: Arc<dyn TaskStore>,
        sessions: Arc<dyn FlowSessionStore>,
        settings: AggregationSettings,
    ) -> Self {
        Self {
            store,
            sessions,
            committer: Arc::new(NoopApprovalCommitter),
            settings,
        }
    }

    pub fn with_committer(mut self, committer: Arc<dyn ApprovalCommitter>) -> Self {
        self.committer = committer;
        self
    }

    /// Next state from the submitted control flags and the persisted flag alone.
    ///
    /// `None` means the form is only being displayed. Ticking "filter agents
    /// first" always asks for another round; otherwise any submission is
    /// final, carrying an agent choice when narrowing was requested earlier.
    pub fn decide(
        current: FlowState,
        submission: Option<SubmissionFlags>,
        persisted_filter_agents: bool,
    ) -> FlowTransition {
        let filter_agents =
            persisted_filter_agents || submission.is_some_and(|flags| flags.filter_agents);

        let (to, filter_agents) = match submission {
            None if filter_agents => (FlowState::AwaitingAgentSelection, true),
            None => (FlowState::AwaitingAgentFilterChoice, false),
            Some(flags) if flags.filter_agents_first => (FlowState::AwaitingAgentSelection, true),
            Some(_) => (FlowState::Submitted, filter_agents),
        };
        let complete = to.is_terminal();
        // The final round still lists agents when narrowing was requested
        let show_agents = to.shows_agents() || (complete && filter_agents);

        FlowTransition {
            from: current,
            to,
            complete,
            show_agents,
            filter_agents,
        }
    }

    /// Run one round: display the form when `submission` is `None`, otherwise process it
    pub async fn handle(
        &self,
        token: Option<Uuid>,
        submission: Option<&FormFields>,
    ) -> ApprovalResult<FlowResponse> {
        self.sessions.purge_expired(Utc::now()).await?;
        let mut session = self.load_session(token).await?;
        let decoded = submission.map(DecodedSubmission::decode).transpose()?;

        let transition = Self::decide(
            session.state,
            decoded.as_ref().map(SubmissionFlags::from),
            session.filter_agents,
        );
        session.transition(transition.to)?;
        session.filter_agents = transition.filter_agents;

        info!(
            token = %session.token,
            from = %transition.from,
            to = %transition.to,
            complete = transition.complete,
            "Selection flow transition"
        );

        let groups = PendingTaskAggregator::new(self.store.as_ref(), &self.settings)
            .aggregate()
            .await?;
        let packages = PendingPackagesView::from_groups(&groups, &self.settings.no_version_label);

        let selection = Self::current_selection(decoded.as_ref(), &session, &packages);

        let agents = if transition.show_agents {
            let predicate = SelectionPredicateBuilder::build(&selection);
            let agents = AgentAggregator::new(self.store.as_ref())
                .aggregate(predicate.as_ref())
                .await?;
            Some(AgentSelectionView::from_groups(&agents))
        } else {
            None
        };

        if !transition.complete {
            session.selection = selection.clone();
            self.sessions.save(&session).await?;

            return Ok(FlowResponse {
                token: session.token,
                transition,
                packages,
                agents,
                selection,
                approval: None,
                receipt: None,
            });
        }

        let chosen_agents = agents.as_ref().map(|offered| {
            Self::chosen_agents(
                decoded.as_ref().map(|d| &d.agents),
                offered,
            )
        });
        let request = ApprovalRequest {
            selection: selection.clone(),
            agents: chosen_agents,
        };
        let receipt = self.committer.commit(&request).await?;
        self.sessions.remove(session.token).await?;

        info!(
            token = %session.token,
            tasks_selected = receipt.tasks_selected,
            persisted = receipt.persisted,
            "Selection flow submitted"
        );

        Ok(FlowResponse {
            token: session.token,
            transition,
            packages,
            agents,
            selection,
            approval: Some(request),
            receipt: Some(receipt),
        })
    }

    async fn load_session(&self, token: Option<Uuid>) -> ApprovalResult<FlowSession> {
        let Some(token) = token else {
            return Ok(FlowSession::new());
        };

        match self.sessions.load(token).await? {
            Some(session) => Ok(session),
            None => {
                warn!(%token, "Unknown flow session, starting over");
                Ok(FlowSession::new())
            }
        }
    }

    /// Triples posted this round, or the first-round selection when the
    /// round carried none, restricted to what is still pending
    fn current_selection(
        decoded: Option<&DecodedSubmission>,
        session: &FlowSession,
        packages: &PendingPackagesView,
    ) -> Selection {
        let mut selection = match decoded {
            Some(decoded) if !decoded.selection.is_empty() => decoded.selection.clone(),
            _ => session.selection.clone(),
        };

        let offered: HashSet<TaskKey> = packages.task_keys().collect();
        let stale = selection.retain(|key| offered.contains(key));
        if !stale.is_empty() {
            warn!(
                stale = stale.len(),
                "Dropped selected tasks that are no longer pending"
            );
        }
        debug!(selected = selection.len(), "Current selection");
        selection
    }

    fn chosen_agents(
        submitted: Option<&BTreeSet<String>>,
        offered: &AgentSelectionView,
    ) -> BTreeSet<String> {
        let Some(submitted) = submitted else {
            return BTreeSet::new();
        };

        let (chosen, stale): (BTreeSet<String>, BTreeSet<String>) = submitted
            .iter()
            .cloned()
            .partition(|agent| offered.contains(agent));
        if !stale.is_empty() {
            warn!(
                stale = stale.len(),
                "Dropped chosen agents that are not offered for this selection"
            );
        }
        chosen
    }
}
