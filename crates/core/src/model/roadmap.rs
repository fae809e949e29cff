use crate::model::catalog::{Catalog, CatalogItem, Phase};
use crate::model::ids::{ItemId, PhaseId};

type PhaseSpec = (&'static str, &'static str, &'static [(&'static str, &'static str)]);

const CYBER_ROADMAP: &[PhaseSpec] = &[
    (
        "soc",
        "SOC Analyst",
        &[
            ("soc-networking", "Networking Fundamentals (TCP/IP, OSI, DNS)"),
            ("soc-linux", "Linux Administration"),
            ("soc-windows", "Windows Internals & Event Logs"),
            ("soc-fundamentals", "Security Fundamentals"),
            ("soc-siem", "SIEM (Splunk, ELK, Sentinel)"),
            ("soc-ir", "Incident Response"),
            ("soc-mitre", "MITRE ATT&CK Framework"),
            ("soc-scripting", "Scripting (Python, PowerShell, Bash)"),
            ("soc-project1", "Project: Home SOC Lab"),
            ("soc-project2", "Project: Log Analysis Pipeline"),
            ("soc-project3", "Project: Phishing Triage Playbook"),
            ("soc-project4", "Project: Threat Hunting Report"),
        ],
    ),
    (
        "hack",
        "Ethical Hacking",
        &[
            ("hack-networking", "Network Scanning & Enumeration"),
            ("hack-web", "Web Application Fundamentals"),
            ("hack-owasp", "OWASP Top 10"),
            ("hack-recon", "Reconnaissance & OSINT"),
            ("hack-exploit", "Exploitation Basics"),
            ("hack-reporting", "Penetration Test Reporting"),
            ("hack-project1", "Project: Vulnerable VM Walkthroughs"),
            ("hack-project2", "Project: Bug Bounty Recon"),
            ("hack-project3", "Project: Full Pentest Report"),
        ],
    ),
    (
        "red",
        "Red Teaming",
        &[
            ("red-ad", "Active Directory Attacks"),
            ("red-privesc", "Privilege Escalation"),
            ("red-lateral", "Lateral Movement"),
            ("red-persistence", "Persistence Techniques"),
            ("red-evasion", "Defense Evasion"),
            ("red-c2", "Command & Control Frameworks"),
            ("red-project1", "Project: Active Directory Attack Lab"),
            ("red-project2", "Project: Custom C2 Implant"),
            ("red-project3", "Project: Adversary Emulation Plan"),
        ],
    ),
    (
        "ai",
        "AI Security",
        &[
            ("ai-python", "Python for Machine Learning"),
            ("ai-ml", "Machine Learning Fundamentals"),
            ("ai-architecture", "AI System Architecture"),
            ("ai-threats", "AI Threat Landscape"),
            ("ai-prompt", "Prompt Injection & Jailbreaks"),
            ("ai-privacy", "Data Privacy & Model Security"),
            ("ai-project1", "Project: Prompt Injection Lab"),
            ("ai-project2", "Project: Adversarial Examples"),
            ("ai-project3", "Project: Secure LLM Deployment Review"),
        ],
    ),
];

impl Catalog {
    /// The built-in cybersecurity roadmap: SOC, hacking, red team and AI phases.
    ///
    /// # Panics
    ///
    /// Panics if the built-in table is malformed; covered by unit tests.
    #[must_use]
    pub fn cyber_roadmap() -> Self {
        let phases = CYBER_ROADMAP
            .iter()
            .map(|(id, title, items)| {
                let items = items
                    .iter()
                    .map(|(item_id, item_title)| {
                        CatalogItem::new(
                            ItemId::new(*item_id).expect("built-in item id should be valid"),
                            *item_title,
                        )
                        .expect("built-in item title should be valid")
                    })
                    .collect();
                Phase::new(
                    PhaseId::new(*id).expect("built-in phase id should be valid"),
                    *title,
                    items,
                )
                .expect("built-in phase should be valid")
            })
            .collect();
        Catalog::new(phases).expect("built-in catalog should partition cleanly")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_catalog_has_expected_shape() {
        let catalog = Catalog::cyber_roadmap();
        let sizes: Vec<(&str, usize)> = catalog
            .phases()
            .iter()
            .map(|phase| (phase.id().as_str(), phase.len()))
            .collect();
        assert_eq!(sizes, vec![("soc", 12), ("hack", 9), ("red", 9), ("ai", 9)]);
        assert_eq!(catalog.len(), 39);
    }

    #[test]
    fn builtin_items_are_prefixed_by_their_phase() {
        let catalog = Catalog::cyber_roadmap();
        for phase in catalog.phases() {
            for item in phase.items() {
                assert!(
                    item.id().as_str().starts_with(&format!("{}-", phase.id())),
                    "{} is misfiled",
                    item.id()
                );
            }
        }
    }
}
