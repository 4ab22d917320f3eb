use crux_core::capability::{Capability, CapabilityContext, Operation};
use serde::{Deserialize, Serialize};

/// Screens the workflow can hand control back to.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Route {
    Home,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub enum NavigationOperation {
    Navigate { route: Route },
}

impl Operation for NavigationOperation {
    type Output = ();
}

/// Fire-and-forget routing request; the shell owns the router.
#[derive(Clone)]
pub struct Navigation<E> {
    context: CapabilityContext<NavigationOperation, E>,
}

impl<Ev> Capability<Ev> for Navigation<Ev> {
    type Operation = NavigationOperation;
    type MappedSelf<MappedEv> = Navigation<MappedEv>;

    fn map_event<F, NewEv>(&self, f: F) -> Self::MappedSelf<NewEv>
    where
        F: Fn(NewEv) -> Ev + Send + Sync + 'static,
        Ev: 'static,
        NewEv: 'static + Send,
    {
        Navigation::new(self.context.map_event(f))
    }
}

impl<E> Navigation<E>
where
    E: Send + 'static,
{
    pub fn new(context: CapabilityContext<NavigationOperation, E>) -> Self {
        Self { context }
    }

    pub fn navigate(&self, route: Route) {
        let context = self.context.clone();
        self.context.spawn(async move {
            context
                .notify_shell(NavigationOperation::Navigate { route })
                .await;
        });
    }
}
