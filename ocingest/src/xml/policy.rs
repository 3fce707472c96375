//! XACML 2.0 access policy for an episode
//!
//! One permit rule per grant, in grant order, followed by a single
//! catch-all deny rule. The backend evaluates with permit-overrides, so the
//! deny rule only applies when no grant matched.

use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::Writer;

use super::XmlError;
use crate::models::AccessGrant;

/// `PolicyId` used when the package identifier is unknown
pub const FALLBACK_POLICY_ID: &str = "mediapackage-1";

const XACML_POLICY_NS: &str = "urn:oasis:names:tc:xacml:2.0:policy:schema:os";
const PERMIT_OVERRIDES: &str =
    "urn:oasis:names:tc:xacml:1.0:rule-combining-algorithm:permit-overrides";
const STRING_EQUAL: &str = "urn:oasis:names:tc:xacml:1.0:function:string-equal";
const STRING_IS_IN: &str = "urn:oasis:names:tc:xacml:1.0:function:string-is-in";
const ACTION_ID: &str = "urn:oasis:names:tc:xacml:1.0:action:action-id";
const SUBJECT_ROLE: &str = "urn:oasis:names:tc:xacml:2.0:subject:role";
const XS_STRING: &str = "http://www.w3.org/2001/XMLSchema#string";

const DENY_RULE_ID: &str = "DenyRule";

/// Render the access policy for `grants` on package `package_id`
///
/// An empty grant list renders a deny-only policy; whether that is
/// acceptable is for the caller to decide.
pub fn build_access_policy(grants: &[AccessGrant], package_id: &str) -> Result<String, XmlError> {
    if let Some(bad) = grants
        .iter()
        .find(|g| g.role.trim().is_empty() || g.action.trim().is_empty())
    {
        return Err(XmlError::Validation(format!(
            "Grant needs both role and action, got role={:?} action={:?}",
            bad.role, bad.action
        )));
    }

    let policy_id = if package_id.is_empty() {
        FALLBACK_POLICY_ID
    } else {
        package_id
    };

    let mut w = PolicyWriter::new();
    w.event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))?;
    w.open(
        "Policy",
        &[
            ("PolicyId", policy_id),
            ("Version", "2.0"),
            ("RuleCombiningAlgId", PERMIT_OVERRIDES),
            ("xmlns", XACML_POLICY_NS),
        ],
    )?;

    for grant in grants {
        let rule_id = format!("{}_{}_PERMIT", grant.role, grant.action);
        w.open("Rule", &[("RuleId", rule_id.as_str()), ("Effect", "Permit")])?;

        w.open("Target", &[])?;
        w.open("Actions", &[])?;
        w.open("Action", &[])?;
        w.open("ActionMatch", &[("MatchId", STRING_EQUAL)])?;
        w.leaf("ActionValue", &[("DataType", XS_STRING)], &grant.action)?;
        w.leaf(
            "ActionAttributeDesignator",
            &[("AttributeId", ACTION_ID), ("DataType", XS_STRING)],
            &grant.action,
        )?;
        w.close("ActionMatch")?;
        w.close("Action")?;
        w.close("Actions")?;
        w.close("Target")?;

        w.open("Condition", &[])?;
        w.open("Apply", &[("FunctionId", STRING_IS_IN)])?;
        w.leaf("AttributeValue", &[("DataType", XS_STRING)], &grant.role)?;
        w.leaf(
            "SubjectAttributeDesignator",
            &[("AttributeId", SUBJECT_ROLE), ("DataType", XS_STRING)],
            "",
        )?;
        w.close("Apply")?;
        w.close("Condition")?;

        w.close("Rule")?;
    }

    w.leaf("Rule", &[("RuleId", DENY_RULE_ID), ("Effect", "Deny")], "")?;
    w.close("Policy")?;
    w.finish()
}

/// Indenting writer that never self-closes elements
struct PolicyWriter {
    inner: Writer<Vec<u8>>,
}

impl PolicyWriter {
    fn new() -> Self {
        Self {
            inner: Writer::new_with_indent(Vec::new(), b' ', 2),
        }
    }

    fn event(&mut self, event: Event<'_>) -> Result<(), XmlError> {
        self.inner.write_event(event).map_err(XmlError::write)
    }

    fn open(&mut self, name: &str, attrs: &[(&str, &str)]) -> Result<(), XmlError> {
        let start = BytesStart::new(name).with_attributes(attrs.iter().copied());
        self.event(Event::Start(start))
    }

    fn close(&mut self, name: &str) -> Result<(), XmlError> {
        self.event(Event::End(BytesEnd::new(name)))
    }

    /// Element with text content; an empty text keeps start and end tags
    /// on one line
    fn leaf(&mut self, name: &str, attrs: &[(&str, &str)], text: &str) -> Result<(), XmlError> {
        self.open(name, attrs)?;
        self.event(Event::Text(BytesText::new(text)))?;
        self.close(name)
    }

    fn finish(self) -> Result<String, XmlError> {
        String::from_utf8(self.inner.into_inner()).map_err(XmlError::write)
    }
}
