/*!

This is the long-form manual for `election_lookup` and `chunav`.

## Datasets

All the data is a frozen snapshot, one JSON array per file. Over HTTP the files
are served as `/data/<name>.json`; with a local directory they are read as
`<dir>/<name>.json`.

| name                                  | records                                   |
|---------------------------------------|-------------------------------------------|
| `dim_current_fptp_candidates`         | first-past-the-post candidates            |
| `dim_current_proportional_candidates` | proportional representation list members  |
| `dim_constituency_profile`            | constituencies with 2074 and 2079 results |
| `dim_parties_profile`                 | parties, seat history, current statistics |
| `political_party_symbols`             | party symbols, by English or Nepali name  |
| `candidates_political_history`        | election and political events per person  |

Each file is fetched at most once per cache, however many views ask for it.

### Result tables

The result tables of `dim_constituency_profile` (`fptp_2079_results`,
`fptp_2074_results`, `proportional_2079_results`) are either real JSON arrays
or, in older exports, strings in Python notation:

```text
[{'candidate_name': 'A', 'party_name': 'P', 'vote_count': 10, 'remarks': None}]
```

Both are accepted. A table that cannot be read is treated as empty.

### Tags

Candidate tags are badge ids such as `educated` or `loyal`. Older exports use the
Nepali badge names instead (`शिक्षित`, `बफादार`). Both are turned into badge ids
when the data is loaded; tags that match no badge are dropped. Run
`chunav badges` for the full list.

## Query parameters

The filters of every page are kept in the query string, so that a filtered view
can be shared as a link.

| parameter      | page          | value                                     |
|----------------|---------------|-------------------------------------------|
| `tab`          | candidates    | `fptp` (default, never written) or `pr`   |
| `state`        | candidates    | state id                                  |
| `district`     | candidates    | district id                               |
| `constituency` | candidates    | constituency number within the district   |
| `party`        | candidates    | party name (FPTP), party id or name (PR)  |
| `group`        | candidates    | inclusive group id or name (PR only)      |
| `badges`       | candidates    | comma separated badge ids                 |
| `candidate`    | candidates    | candidate id (FPTP) or serial number (PR) |
| `state`        | constituency  | state name                                |
| `district`     | constituency  | district name                             |
| `constituency` | constituency  | constituency number                       |
| `party`        | party         | party id                                  |
| `party1`       | comparison    | party id                                  |
| `party2`       | comparison    | party id                                  |

A parameter at its default value (0, empty) is left out. Each badge of `badges`
is percent-encoded on its own before joining, so `badges=educated,loyal` reads
as two badges. A list encoded as a whole, `badges=educated%2Cloyal`, reads the
same. Values that cannot be read fall back to the default. Other
parameters in the query string are kept as they are.

## Filtering

Geography narrows from state to district to constituency. Districts are offered
once a state is chosen and constituencies once a district is chosen. Changing a
level clears every level below it, the party and the selected candidate. When a
district or constituency has a single possible value, that value is chosen.

Badges combine with AND: `badges=educated,loyal` keeps the candidates that have
both badges. Only badges carried by at least one candidate of the current
geography are offered.

When the filters leave a single candidate, that candidate is selected. On the
PR list this needs a party or a group: badges alone never select. A
candidate in the query string that does not match the filters is dropped.

## Command line

```text
chunav --data-dir ./public/data candidates --query 'state=1&badges=educated'
chunav --base-url https://example.org pr --query 'party=7&group=3'
chunav --data-dir ./public/data compare --query 'party1=2&party2=5'
```

The output is JSON. With `--reference FILE`, the output is compared with the
content of `FILE` and the differences are printed.

 */
