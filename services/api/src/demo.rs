use crate::infra::{ConsoleObserver, InMemoryAllocationRepository};
use clap::Args;
use intern_ai::config::AllocationConfig;
use intern_ai::error::AppError;
use intern_ai::workflows::allocation::{
    AcademicLevel, AllocationService, Candidate, CandidateId, Provider, ProviderId, Roster,
    RunReport, SizeClass, StatusTracker,
};
use intern_ai::workflows::roster::RosterImporter;
use std::path::PathBuf;
use std::sync::Arc;

#[derive(Args, Debug, Default)]
pub(crate) struct DemoArgs {
    /// Stream agent log entries while the pipeline runs.
    #[arg(long)]
    pub(crate) show_logs: bool,
    /// Print per-student analyses and top company rankings.
    #[arg(long)]
    pub(crate) details: bool,
}

#[derive(Args, Debug)]
pub(crate) struct AllocateArgs {
    /// Student CSV export (id,name,major,year,gpa,skills,interests)
    #[arg(long)]
    pub(crate) candidates: PathBuf,
    /// Company CSV export (id,name,industry,location,size,positions,requirements,culture)
    #[arg(long)]
    pub(crate) providers: PathBuf,
    /// Stream agent log entries while the pipeline runs.
    #[arg(long)]
    pub(crate) show_logs: bool,
    /// Emit the run report as JSON instead of the text summary.
    #[arg(long)]
    pub(crate) json: bool,
}

pub(crate) fn run_allocate(args: AllocateArgs) -> Result<(), AppError> {
    let AllocateArgs {
        candidates,
        providers,
        show_logs,
        json,
    } = args;

    let roster = RosterImporter::default().roster_from_paths(candidates, providers)?;
    let report = allocate(roster.clone(), show_logs && !json)?;

    if json {
        let payload = serde_json::to_string_pretty(&report).map_err(std::io::Error::from)?;
        println!("{payload}");
    } else {
        render_report(&roster, &report, false);
    }
    Ok(())
}

pub(crate) fn run_demo(args: DemoArgs) -> Result<(), AppError> {
    let DemoArgs { show_logs, details } = args;

    let roster = demo_roster();
    println!(
        "Internship allocation demo: {} students, {} companies, {} open positions",
        roster.candidates.len(),
        roster.providers.len(),
        roster
            .providers
            .iter()
            .map(|provider| provider.capacity)
            .sum::<u32>()
    );

    let report = allocate(roster.clone(), show_logs)?;
    render_report(&roster, &report, details);
    Ok(())
}

fn allocate(roster: Roster, show_logs: bool) -> Result<RunReport, AppError> {
    let repository = Arc::new(InMemoryAllocationRepository::default());
    let tracker = if show_logs {
        StatusTracker::forwarding_to(Arc::new(ConsoleObserver))
    } else {
        StatusTracker::default()
    };
    let config = AllocationConfig::default();
    let service = AllocationService::with_tracker(repository, &config, tracker);
    Ok(service.run(roster)?)
}

fn render_report(roster: &Roster, report: &RunReport, details: bool) {
    println!("\nAllocation run {} ({})", report.run_id, report.outcome);
    if let Some(failure) = &report.failure {
        println!("- {} failed: {}", failure.agent, failure.error);
    }

    let summary = &report.summary;
    println!(
        "- {} of {} students placed ({}%) | average score {}",
        summary.allocated, summary.candidates, summary.placement_rate, summary.average_score
    );
    println!(
        "- {} excellent | {} good | {} moderate",
        summary.excellent, summary.good, summary.moderate
    );

    if report.allocations.is_empty() {
        println!("Allocations: none");
    } else {
        println!("Allocations:");
        for view in &report.allocations {
            println!(
                "  - {} {} -> {} (score {}, {})",
                view.allocation_id.0, view.candidate, view.provider, view.score, view.status
            );
            println!("    {}", view.rationale);
        }
    }

    println!("Remaining positions:");
    for provider in &roster.providers {
        let remaining = report
            .remaining_capacity
            .get(&provider.id)
            .copied()
            .unwrap_or(provider.capacity);
        println!(
            "  - {}: {} of {} open",
            provider.name, remaining, provider.capacity
        );
    }

    let unplaced: Vec<&str> = roster
        .candidates
        .iter()
        .filter(|candidate| {
            !report
                .allocations
                .iter()
                .any(|view| view.candidate == candidate.name)
        })
        .map(|candidate| candidate.name.as_str())
        .collect();
    if !unplaced.is_empty() {
        println!("Unplaced: {}", unplaced.join(", "));
    }

    println!("Agents:");
    for (stage, status) in &report.agents {
        println!("  - {}: {}", stage.agent(), status.label());
    }

    if details {
        render_details(roster, report);
    }
}

fn render_details(roster: &Roster, report: &RunReport) {
    println!("\nStudent analyses:");
    for analysis in &report.analyses {
        let name = roster
            .candidate(analysis.candidate_id)
            .map_or("unknown", |candidate| candidate.name.as_str());
        println!(
            "  - {} (compatibility {}): {}",
            name,
            analysis.compatibility,
            analysis.career_paths.join(", ")
        );
        if !analysis.skill_gaps.is_empty() {
            println!("    skill gaps: {}", analysis.skill_gaps.join(", "));
        }
        if let Some(ranking) = report.rankings.get(&analysis.candidate_id) {
            let top: Vec<String> = ranking
                .iter()
                .take(3)
                .map(|insight| {
                    let provider = roster
                        .provider(insight.provider_id)
                        .map_or("unknown", |provider| provider.name.as_str());
                    format!("{provider} {}", insight.score)
                })
                .collect();
            println!("    top matches: {}", top.join(" | "));
        }
    }
}

fn strings(values: &[&str]) -> Vec<String> {
    values.iter().map(|value| value.to_string()).collect()
}

fn demo_student(
    id: u64,
    name: &str,
    major: &str,
    year: &str,
    gpa: f32,
    skills: &[&str],
    interests: &[&str],
) -> Candidate {
    let email = format!("{}@university.edu", name.to_ascii_lowercase().replace(' ', "."));
    Candidate {
        id: CandidateId(id),
        name: name.to_string(),
        email: Some(email),
        major: Some(major.to_string()),
        level: AcademicLevel::from_label(year),
        gpa,
        skills: strings(skills),
        interests: strings(interests),
    }
}

#[allow(clippy::too_many_arguments)]
fn demo_company(
    id: u64,
    name: &str,
    industry: &str,
    location: &str,
    size: &str,
    positions: u32,
    requirements: &[&str],
    culture: &[&str],
) -> Provider {
    Provider {
        id: ProviderId(id),
        name: name.to_string(),
        category: industry.to_string(),
        location: location.to_string(),
        size: SizeClass::from_label(size),
        requirements: strings(requirements),
        culture: strings(culture),
        capacity: positions,
    }
}

pub(crate) fn demo_roster() -> Roster {
    let candidates = vec![
        demo_student(
            1,
            "Alice Johnson",
            "Computer Science",
            "Junior",
            3.8,
            &["React", "TypeScript", "Node.js", "Python", "Machine Learning", "AWS", "Docker"],
            &["AI/ML", "Web Development", "Data Science", "Cloud Computing"],
        ),
        demo_student(
            2,
            "Bob Smith",
            "Data Science",
            "Senior",
            3.6,
            &["Python", "R", "SQL", "Machine Learning", "Statistics", "Tableau", "Pandas"],
            &["Data Science", "AI/ML", "Research", "Analytics"],
        ),
        demo_student(
            3,
            "Carol Davis",
            "Software Engineering",
            "Sophomore",
            3.7,
            &["Java", "Spring Boot", "React", "Docker", "AWS", "MySQL", "Git"],
            &["Web Development", "Cloud Computing", "DevOps", "Mobile Development"],
        ),
        demo_student(
            4,
            "David Wilson",
            "Information Technology",
            "Senior",
            3.5,
            &["C#", ".NET", "Azure", "SQL Server", "Power BI", "JavaScript", "HTML/CSS"],
            &["Enterprise Software", "Business Intelligence", "Database Management"],
        ),
        demo_student(
            5,
            "Emma Brown",
            "Cybersecurity",
            "Junior",
            3.9,
            &[
                "Python",
                "Linux",
                "Network Security",
                "Ethical Hacking",
                "C++",
                "Wireshark",
                "Kali Linux",
            ],
            &["Cybersecurity", "Network Security", "Ethical Hacking", "Digital Forensics"],
        ),
    ];

    let providers = vec![
        demo_company(
            1,
            "TechInnovate Inc.",
            "Technology",
            "San Francisco, CA",
            "Startup (50-100 employees)",
            2,
            &["Python", "Machine Learning", "React", "AWS", "Docker", "TensorFlow"],
            &["Innovation", "Collaboration", "Growth Mindset", "Remote Work", "Learning", "Agile"],
        ),
        demo_company(
            2,
            "DataCorp Solutions",
            "Data Analytics",
            "New York, NY",
            "Medium (201-1000 employees)",
            1,
            &["SQL", "Python", "Tableau", "Statistics", "R", "Power BI", "Data Visualization"],
            &[
                "Data-Driven",
                "Professional",
                "Learning",
                "Teamwork",
                "Analytical",
                "Results-Oriented",
            ],
        ),
        demo_company(
            3,
            "WebCraft Studios",
            "Web Development",
            "Austin, TX",
            "Small (51-200 employees)",
            1,
            &["React", "Node.js", "TypeScript", "UI/UX", "JavaScript", "CSS", "Figma"],
            &[
                "Creative",
                "Flexible",
                "Collaborative",
                "Innovation",
                "Design-Focused",
                "Client-Centric",
            ],
        ),
        demo_company(
            4,
            "CloudTech Systems",
            "Cloud Computing",
            "Seattle, WA",
            "Large (1000+ employees)",
            2,
            &["AWS", "Azure", "Docker", "Kubernetes", "Python", "Terraform", "Linux"],
            &[
                "Technical Excellence",
                "Innovation",
                "Collaboration",
                "Continuous Learning",
                "Agile",
                "Remote-Friendly",
            ],
        ),
        demo_company(
            5,
            "SecureNet Technologies",
            "Cybersecurity",
            "Boston, MA",
            "Medium (201-1000 employees)",
            1,
            &[
                "Python",
                "Linux",
                "Network Security",
                "C++",
                "Wireshark",
                "SIEM",
                "Penetration Testing",
            ],
            &[
                "Security-First",
                "Continuous Learning",
                "Technical Excellence",
                "Collaboration",
                "Innovation",
                "Ethical",
            ],
        ),
    ];

    Roster::new(candidates, providers)
}
