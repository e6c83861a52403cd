use crate::api::presence::CalculationResponse;
use crate::api::upload::UploadForm;
use crate::engine::aggregator::{DirectorateKpi, UsageTier};
use crate::engine::ingest::IngestionResult;
use crate::engine::ranker::{SortColumn, SortDirection, SortState};
use crate::model::source::SourceKind;
use crate::model::summary::PresenceSummary;
use crate::store::SnapshotInfo;
use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Office Presence API",
        version = "0.1.0",
        description = r#"
## Office Presence

Reconciles three spreadsheets keyed by employee id and reports how much each
employee, and each directorate, actually uses the building.

### 🔹 Inputs
- **Staff directory** (`id`/`employeeId`/`employee_id`, `name`, `directorate`, `department`)
- **Card logins** (`employeeId`/`employee_id`/`id`, `date`, `time`)
- **Official leaves** (`employeeId`/`employee_id`/`id`, `date`, `reason`)

Each upload replaces only its own dataset. Rows without an employee id are
skipped and counted; swipes and leave for unknown employees are ignored.

### 📐 Figures
- **Working days**: distinct dates on which anybody swiped in
- **Building usage**: login days / (working days - leave days), or `N/A`
- **Directorate KPI**: mean usage of members with a non-zero usage

### 📦 Uploads
`.xlsx` (first sheet) or `.csv`, sent as multipart field `file`.

---
Built with **Rust**, **Actix Web**, **SQLx**, and **Utoipa**.
"#,
    ),
    paths(
        crate::api::upload::upload_employees,
        crate::api::upload::upload_card_login,
        crate::api::upload::upload_official_leaves,

        crate::api::presence::calculate,
        crate::api::presence::directorates,
        crate::api::presence::sources
    ),
    components(
        schemas(
            UploadForm,
            IngestionResult,
            SourceKind,
            PresenceSummary,
            CalculationResponse,
            SortColumn,
            SortDirection,
            SortState,
            DirectorateKpi,
            UsageTier,
            SnapshotInfo
        )
    ),
    tags(
        (name = "Upload", description = "Dataset upload APIs"),
        (name = "Presence", description = "Presence calculation and KPI APIs"),
    )
)]
pub struct ApiDoc;
